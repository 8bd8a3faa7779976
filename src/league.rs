use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{LeagueError, Result};
use crate::fixture::{Match, MatchId};
use crate::team::{Team, TeamId};

/// A league snapshot: teams and fixtures that refer to each other by id only.
///
/// Cloning a league yields a fully independent branch, which is what
/// projections rely on to never touch the authoritative state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
}

impl League {
    pub fn new(teams: Vec<Team>, matches: Vec<Match>) -> Self {
        League { teams, matches }
    }

    /// The four-team, six-week double round-robin used to seed a fresh league.
    pub fn bootstrap() -> Self {
        let teams = vec![
            Team::new(1, "Lions", 90),
            Team::new(2, "Tigers", 80),
            Team::new(3, "Bears", 70),
            Team::new(4, "Wolves", 60),
        ];

        let matches = vec![
            Match::new(1, 1, 2, 1),
            Match::new(2, 3, 4, 1),
            Match::new(3, 1, 3, 2),
            Match::new(4, 2, 4, 2),
            Match::new(5, 1, 4, 3),
            Match::new(6, 2, 3, 3),
            Match::new(7, 2, 1, 4),
            Match::new(8, 4, 3, 4),
            Match::new(9, 3, 1, 5),
            Match::new(10, 4, 2, 5),
            Match::new(11, 4, 1, 6),
            Match::new(12, 3, 2, 6),
        ];

        League { teams, matches }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a league snapshot from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .ok_or(LeagueError::UnknownTeam(id))
    }

    pub fn team_name(&self, id: TeamId) -> Result<&str> {
        self.team(id).map(|t| t.name.as_str())
    }

    pub fn match_by_id(&self, id: MatchId) -> Result<&Match> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(LeagueError::UnknownMatch(id))
    }

    /// Check that the snapshot is safe to simulate and tabulate.
    ///
    /// Ids must be unique, every fixture must reference two distinct known
    /// teams in a positive week, and no fixture may pair two zero-strength teams.
    pub fn validate(&self) -> Result<()> {
        let mut team_ids = HashSet::with_capacity(self.teams.len());
        for team in &self.teams {
            if !team_ids.insert(team.id) {
                return Err(LeagueError::DuplicateTeam(team.id));
            }
        }

        let mut match_ids = HashSet::with_capacity(self.matches.len());
        for m in &self.matches {
            if !match_ids.insert(m.id) {
                return Err(LeagueError::DuplicateMatch(m.id));
            }
            if m.home_team_id == m.away_team_id {
                return Err(LeagueError::SelfMatch {
                    match_id: m.id,
                    team_id: m.home_team_id,
                });
            }
            if m.week == 0 {
                return Err(LeagueError::InvalidWeek { match_id: m.id });
            }

            let home = self.team(m.home_team_id)?;
            let away = self.team(m.away_team_id)?;
            if home.strength == 0 && away.strength == 0 {
                return Err(LeagueError::DegenerateStrength { home: 0, away: 0 });
            }
        }

        Ok(())
    }

    /// Record (or overwrite) the result of a match.
    pub fn record_result(&mut self, match_id: MatchId, home_goals: u32, away_goals: u32) -> Result<()> {
        let m = self
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or(LeagueError::UnknownMatch(match_id))?;
        m.record(home_goals, away_goals);
        Ok(())
    }

    /// Mark every match unplayed.
    pub fn reset_results(&mut self) {
        for m in &mut self.matches {
            m.clear();
        }
    }

    /// Earliest week that still has an unplayed fixture.
    pub fn next_week(&self) -> Option<u32> {
        self.matches
            .iter()
            .filter(|m| !m.is_played())
            .map(|m| m.week)
            .min()
    }

    /// Latest week with at least one played match, or 0 when nothing has been played.
    pub fn latest_played_week(&self) -> u32 {
        self.matches
            .iter()
            .filter(|m| m.is_played())
            .map(|m| m.week)
            .max()
            .unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(Match::is_played)
    }

    /// Result lines such as `"Lions 2 - 1 Tigers"` for the played matches of a week.
    pub fn match_results_for_week(&self, week: u32) -> Result<Vec<String>> {
        let mut results = Vec::new();
        for m in self.matches.iter().filter(|m| m.week == week) {
            if let Some(line) = self.format_result(m)? {
                results.push(line);
            }
        }
        Ok(results)
    }

    /// Result lines for every played match, grouped by week.
    pub fn results_by_week(&self) -> Result<BTreeMap<u32, Vec<String>>> {
        let mut results: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for m in &self.matches {
            if let Some(line) = self.format_result(m)? {
                results.entry(m.week).or_default().push(line);
            }
        }
        Ok(results)
    }

    fn format_result(&self, m: &Match) -> Result<Option<String>> {
        let Some(score) = m.score else {
            return Ok(None);
        };
        Ok(Some(format!(
            "{} {} - {} {}",
            self.team_name(m.home_team_id)?,
            score.home,
            score.away,
            self.team_name(m.away_team_id)?
        )))
    }
}
