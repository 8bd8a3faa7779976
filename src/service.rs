use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::error::{LeagueError, Result};
use crate::fixture::{Match, MatchId};
use crate::league::League;
use crate::outcome::simulate_fixture;
use crate::projection::{estimate_champions, project_final_table, ProjectionConfig};
use crate::standings::{compute_table, league_standings, LeagueTableEntry, Standing};

/// Source of the authoritative league snapshot.
pub trait LeagueRepository {
    fn get_league(&self) -> Result<League>;

    /// Mark every stored match unplayed.
    fn reset_results(&self) -> Result<()>;
}

/// Destination for results of real (non-projected) matches.
pub trait ResultSink {
    fn record_result(&self, match_id: MatchId, home_goals: u32, away_goals: u32) -> Result<()>;
}

/// Keeps the league in memory behind a lock.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    league: RwLock<League>,
}

impl MemoryRepository {
    pub fn new(league: League) -> Self {
        MemoryRepository {
            league: RwLock::new(league),
        }
    }
}

fn poisoned<T>(_: T) -> LeagueError {
    LeagueError::Repository("league lock poisoned".to_string())
}

impl LeagueRepository for MemoryRepository {
    fn get_league(&self) -> Result<League> {
        Ok(self.league.read().map_err(poisoned)?.clone())
    }

    fn reset_results(&self) -> Result<()> {
        self.league.write().map_err(poisoned)?.reset_results();
        Ok(())
    }
}

impl ResultSink for MemoryRepository {
    fn record_result(&self, match_id: MatchId, home_goals: u32, away_goals: u32) -> Result<()> {
        self.league
            .write()
            .map_err(poisoned)?
            .record_result(match_id, home_goals, away_goals)
    }
}

/// Standings plus the result lines of one week.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekReport {
    pub week: u32,
    pub standings: Vec<Standing>,
    pub match_results: Vec<String>,
}

/// A speculative end-of-season table next to the results it was built on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalTableEstimate {
    /// Played matches up to the cutoff week
    pub known_results: Vec<Match>,
    pub standings: Vec<Standing>,
    pub match_results: Vec<String>,
}

/// Live league operations over an explicit repository and generator.
pub struct LeagueService<R> {
    repository: R,
    rng: ChaCha8Rng,
    config: ProjectionConfig,
}

impl<R: LeagueRepository + ResultSink> LeagueService<R> {
    pub fn new(repository: R) -> Self {
        LeagueService {
            repository,
            rng: ChaCha8Rng::from_entropy(),
            config: ProjectionConfig::default(),
        }
    }

    /// A service whose live simulations are reproducible.
    pub fn with_seed(repository: R, seed: u64) -> Self {
        LeagueService {
            repository,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config: ProjectionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProjectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Current standings and the results of the latest played week.
    pub fn table(&self) -> Result<WeekReport> {
        let league = self.repository.get_league()?;
        report(&league, league.latest_played_week())
    }

    /// Simulate the unplayed matches of the earliest open week.
    ///
    /// When the season is already complete nothing is simulated and the
    /// latest week is reported.
    pub fn play_next_week(&mut self) -> Result<WeekReport> {
        let mut league = self.repository.get_league()?;
        league.validate()?;

        let Some(week) = league.next_week() else {
            debug!("season complete, nothing to play");
            return report(&league, league.latest_played_week());
        };

        let ids: Vec<MatchId> = league
            .matches
            .iter()
            .filter(|m| m.week == week && !m.is_played())
            .map(|m| m.id)
            .collect();
        self.play_matches(&mut league, &ids)?;

        info!("played week {} ({} matches)", week, ids.len());
        report(&league, week)
    }

    /// Simulate every unplayed match of the season.
    pub fn play_all(&mut self) -> Result<WeekReport> {
        let mut league = self.repository.get_league()?;
        league.validate()?;

        let ids: Vec<MatchId> = league
            .matches
            .iter()
            .filter(|m| !m.is_played())
            .map(|m| m.id)
            .collect();
        self.play_matches(&mut league, &ids)?;

        info!("played remaining {} matches", ids.len());
        report(&league, league.latest_played_week())
    }

    fn play_matches(&mut self, league: &mut League, ids: &[MatchId]) -> Result<()> {
        for &id in ids {
            let m = league.match_by_id(id)?;
            let home = league.team(m.home_team_id)?;
            let away = league.team(m.away_team_id)?;
            let score = simulate_fixture(home, away, &mut self.rng)?;
            debug!("week {}: {} {} - {} {}", m.week, home.name, score.home, score.away, away.name);

            self.repository.record_result(id, score.home, score.away)?;
            league.record_result(id, score.home, score.away)?;
        }
        Ok(())
    }

    /// Set a result by hand, played or not, and return the updated table.
    pub fn edit_match_result(
        &mut self,
        match_id: MatchId,
        home_goals: u32,
        away_goals: u32,
    ) -> Result<Vec<LeagueTableEntry>> {
        let mut league = self.repository.get_league()?;
        league.match_by_id(match_id)?;

        self.repository.record_result(match_id, home_goals, away_goals)?;
        league.record_result(match_id, home_goals, away_goals)?;
        info!("match {} set to {} - {}", match_id, home_goals, away_goals);

        compute_table(&league.teams, &league.matches)
    }

    /// Clear every result.
    pub fn reset(&self) -> Result<()> {
        self.repository.reset_results()?;
        info!("league reset");
        Ok(())
    }

    pub fn results_by_week(&self) -> Result<BTreeMap<u32, Vec<String>>> {
        self.repository.get_league()?.results_by_week()
    }

    /// One speculative completion of the season past the cutoff week.
    pub fn estimate_final_table(&mut self) -> Result<FinalTableEstimate> {
        let league = self.repository.get_league()?;
        league.validate()?;

        let cutoff = self.config.cutoff_week;
        let standings = project_final_table(&league, cutoff, &mut self.rng)?;
        let known_results = league
            .matches
            .iter()
            .filter(|m| m.week <= cutoff && m.is_played())
            .cloned()
            .collect();

        Ok(FinalTableEstimate {
            known_results,
            standings,
            match_results: league.match_results_for_week(league.latest_played_week())?,
        })
    }

    /// Championship percentages from a Monte Carlo projection of the current snapshot.
    pub fn estimate_champions(&self) -> Result<HashMap<String, f64>> {
        let league = self.repository.get_league()?;
        estimate_champions(&league, &self.config)
    }
}

fn report(league: &League, week: u32) -> Result<WeekReport> {
    Ok(WeekReport {
        week,
        standings: league_standings(league)?,
        match_results: league.match_results_for_week(week)?,
    })
}
