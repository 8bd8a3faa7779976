use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::constants::{DRAW_POINTS, WIN_POINTS};
use crate::error::{LeagueError, Result};
use crate::fixture::Match;
use crate::league::League;
use crate::team::{Team, TeamId};

/// One row of the league table, derived fresh from match history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueTableEntry {
    pub team_id: TeamId,
    pub team_name: String,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub matches_played: u32,
}

impl LeagueTableEntry {
    fn empty(team: &Team) -> Self {
        LeagueTableEntry {
            team_id: team.id,
            team_name: team.name.clone(),
            points: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            matches_played: 0,
        }
    }

    fn add_result(&mut self, scored: u32, conceded: u32) {
        self.goals_for += scored;
        self.goals_against += conceded;
        self.matches_played += 1;
        self.points += match scored.cmp(&conceded) {
            Ordering::Greater => WIN_POINTS,
            Ordering::Equal => DRAW_POINTS,
            Ordering::Less => 0,
        };
    }
}

/// Points, then goal difference, then goals scored (all descending), then name.
fn compare_entries(a: &LeagueTableEntry, b: &LeagueTableEntry) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team_name.cmp(&b.team_name))
}

/// Win/draw/loss counts for one team
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

/// A table row joined with the team's win/draw/loss record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    #[serde(flatten)]
    pub entry: LeagueTableEntry,

    #[serde(flatten)]
    pub record: Record,
}

/// Build the sorted league table.
///
/// Unplayed matches contribute nothing; a team without played matches gets
/// an all-zero row. Equal rows keep the order of `teams`.
///
/// # Errors
/// `UnknownTeam` if any match references a team that is not in `teams`.
pub fn compute_table(teams: &[Team], matches: &[Match]) -> Result<Vec<LeagueTableEntry>> {
    let mut table: Vec<LeagueTableEntry> = teams.iter().map(LeagueTableEntry::empty).collect();
    let index: HashMap<TeamId, usize> = teams.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

    for m in matches {
        let home = *index
            .get(&m.home_team_id)
            .ok_or(LeagueError::UnknownTeam(m.home_team_id))?;
        let away = *index
            .get(&m.away_team_id)
            .ok_or(LeagueError::UnknownTeam(m.away_team_id))?;

        let Some(score) = m.score else {
            continue;
        };

        table[home].add_result(score.home, score.away);
        table[away].add_result(score.away, score.home);
    }

    for entry in &mut table {
        entry.goal_difference = i64::from(entry.goals_for) - i64::from(entry.goals_against);
    }

    table.sort_by(compare_entries);
    Ok(table)
}

/// Count wins, draws and losses per team over the played matches.
pub fn compute_records(matches: &[Match]) -> HashMap<TeamId, Record> {
    let mut records: HashMap<TeamId, Record> = HashMap::new();

    for m in matches {
        let Some(score) = m.score else {
            continue;
        };

        match score.home.cmp(&score.away) {
            Ordering::Greater => {
                records.entry(m.home_team_id).or_default().wins += 1;
                records.entry(m.away_team_id).or_default().losses += 1;
            }
            Ordering::Less => {
                records.entry(m.away_team_id).or_default().wins += 1;
                records.entry(m.home_team_id).or_default().losses += 1;
            }
            Ordering::Equal => {
                records.entry(m.home_team_id).or_default().draws += 1;
                records.entry(m.away_team_id).or_default().draws += 1;
            }
        }
    }

    records
}

/// Join a computed table with win/draw/loss records, keeping the table's order.
pub fn compute_standings_with_record(table: &[LeagueTableEntry], matches: &[Match]) -> Vec<Standing> {
    let records = compute_records(matches);

    table
        .iter()
        .map(|entry| Standing {
            entry: entry.clone(),
            record: records.get(&entry.team_id).copied().unwrap_or_default(),
        })
        .collect()
}

/// Table plus records for a whole league.
pub fn league_standings(league: &League) -> Result<Vec<Standing>> {
    let table = compute_table(&league.teams, &league.matches)?;
    Ok(compute_standings_with_record(&table, &league.matches))
}
