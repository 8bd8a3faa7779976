use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::{CUTOFF_WEEK, DEFAULT_TRIALS};
use crate::error::{LeagueError, Result};
use crate::fixture::Match;
use crate::league::League;
use crate::outcome::{simulate_match, RandomSource};
use crate::standings::{compute_table, league_standings, Standing};
use crate::team::TeamId;

/// Settings for a Monte Carlo season projection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Number of independent trials
    pub trials: usize,

    /// Only unplayed matches in weeks after this one are simulated (0 simulates all)
    pub cutoff_week: u32,

    /// Base seed; `None` derives one from the wall clock
    pub seed: Option<u64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            trials: DEFAULT_TRIALS,
            cutoff_week: CUTOFF_WEEK,
            seed: None,
        }
    }
}

impl ProjectionConfig {
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_cutoff_week(mut self, cutoff_week: u32) -> Self {
        self.cutoff_week = cutoff_week;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn base_seed(&self) -> u64 {
        self.seed.unwrap_or_else(wall_clock_seed)
    }
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// Seed for one trial, distinct for every trial index under the same base.
fn trial_seed(base: u64, trial: usize) -> u64 {
    base.wrapping_add((trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Whether a match is simulated by a projection with this cutoff.
pub fn is_projectable(m: &Match, cutoff_week: u32) -> bool {
    !m.is_played() && m.week > cutoff_week
}

/// Simulate every projectable match in `matches` in place.
fn resolve_remaining<S: RandomSource + ?Sized>(
    matches: &mut [Match],
    strengths: &HashMap<TeamId, u32>,
    cutoff_week: u32,
    source: &mut S,
) -> Result<()> {
    for m in matches.iter_mut().filter(|m| is_projectable(m, cutoff_week)) {
        let home = strength_of(strengths, m.home_team_id)?;
        let away = strength_of(strengths, m.away_team_id)?;
        let score = simulate_match(home, away, source)?;
        m.record(score.home, score.away);
    }
    Ok(())
}

fn strength_of(strengths: &HashMap<TeamId, u32>, id: TeamId) -> Result<u32> {
    strengths.get(&id).copied().ok_or(LeagueError::UnknownTeam(id))
}

fn strengths(league: &League) -> HashMap<TeamId, u32> {
    league.teams.iter().map(|t| (t.id, t.strength)).collect()
}

/// Play out the rest of the season once on a copy of `league`.
///
/// Returns the projected standings, with records counted on the projected
/// results. The league itself is left untouched.
pub fn project_final_table<S: RandomSource + ?Sized>(
    league: &League,
    cutoff_week: u32,
    source: &mut S,
) -> Result<Vec<Standing>> {
    let mut branch = league.clone();
    resolve_remaining(&mut branch.matches, &strengths(league), cutoff_week, source)?;
    league_standings(&branch)
}

/// Champion counts gathered by one worker.
#[derive(Default)]
struct Tally {
    champions: HashMap<TeamId, u32>,
    completed: usize,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Self {
        for (team, count) in other.champions {
            *self.champions.entry(team).or_insert(0) += count;
        }
        self.completed += other.completed;
        self
    }
}

/// Play out one trial and return the team that finishes first.
///
/// Only the fixture list is copied; teams are read through the shared
/// strength index.
fn run_trial(
    league: &League,
    strengths: &HashMap<TeamId, u32>,
    cutoff_week: u32,
    seed: u64,
) -> Result<Option<TeamId>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut matches = league.matches.clone();
    resolve_remaining(&mut matches, strengths, cutoff_week, &mut rng)?;

    let table = compute_table(&league.teams, &matches)?;
    Ok(table.first().map(|entry| entry.team_id))
}

/// Estimate each team's chance of finishing first.
///
/// Returns team name -> percentage of trials won. Teams that never finish
/// first are absent. Zero trials yields an empty map.
pub fn estimate_champions(league: &League, config: &ProjectionConfig) -> Result<HashMap<String, f64>> {
    estimate_champions_with_cancel(league, config, &AtomicBool::new(false))
}

/// Same as [`estimate_champions`], stopping early once `cancel` is set.
///
/// The flag is checked before each trial. Percentages are taken over the
/// trials that actually ran.
pub fn estimate_champions_with_cancel(
    league: &League,
    config: &ProjectionConfig,
    cancel: &AtomicBool,
) -> Result<HashMap<String, f64>> {
    if config.trials == 0 {
        return Ok(HashMap::new());
    }
    league.validate()?;

    let base_seed = config.base_seed();
    let strengths = strengths(league);
    debug!(
        "projecting {} trials after week {} (seed {})",
        config.trials, config.cutoff_week, base_seed
    );

    let tally = (0..config.trials)
        .into_par_iter()
        .map(|trial| {
            if cancel.load(Ordering::Relaxed) {
                return Ok(None);
            }
            run_trial(league, &strengths, config.cutoff_week, trial_seed(base_seed, trial)).map(Some)
        })
        .try_fold(Tally::default, |mut tally, outcome: Result<Option<Option<TeamId>>>| {
            if let Some(champion) = outcome? {
                tally.completed += 1;
                if let Some(team) = champion {
                    *tally.champions.entry(team).or_insert(0) += 1;
                }
            }
            Ok::<Tally, LeagueError>(tally)
        })
        .try_reduce(Tally::default, |a, b| {
            if a.completed > 0 && b.completed > 0 {
                debug!("merging batches of {} and {} trials", a.completed, b.completed);
            }
            Ok(a.merge(b))
        })?;

    if tally.completed < config.trials {
        warn!("projection cancelled after {} of {} trials", tally.completed, config.trials);
    }
    if tally.completed == 0 {
        return Ok(HashMap::new());
    }

    let mut result = HashMap::new();
    for (team, count) in tally.champions {
        let name = league.team_name(team)?.to_string();
        *result.entry(name).or_insert(0.0) += f64::from(count) * 100.0 / tally.completed as f64;
    }

    info!("projection finished: {} trials, {} possible champions", tally.completed, result.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Team;

    fn two_team_league() -> League {
        League::new(
            vec![Team::new(1, "Giants", 90), Team::new(2, "Minnows", 10)],
            vec![Match::new(1, 1, 2, 1)],
        )
    }

    /// Bootstrap league with weeks 1-4 played and Lions out of reach.
    fn decided_league() -> League {
        let mut league = League::bootstrap();
        for m in league.matches.iter_mut().filter(|m| m.week <= 4) {
            if m.involves(1) {
                if m.home_team_id == 1 {
                    m.record(2, 0);
                } else {
                    m.record(0, 2);
                }
            } else {
                m.record(1, 1);
            }
        }
        league
    }

    #[test]
    fn test_default_config() {
        let config = ProjectionConfig::default();
        assert_eq!(config.trials, 1000);
        assert_eq!(config.cutoff_week, 4);
        assert_eq!(config.seed, None);

        let parsed: ProjectionConfig = serde_json::from_str(r#"{"trials": 50}"#).unwrap();
        assert_eq!(parsed, ProjectionConfig::default().with_trials(50));
    }

    #[test]
    fn test_trial_seeds_are_distinct() {
        let seeds: std::collections::HashSet<u64> = (0..1000).map(|t| trial_seed(12345, t)).collect();
        assert_eq!(seeds.len(), 1000);
    }

    #[test]
    fn test_strong_home_side_usually_champion() {
        let config = ProjectionConfig::default().with_cutoff_week(0).with_seed(7);
        let result = estimate_champions(&two_team_league(), &config).unwrap();

        let giants = result.get("Giants").copied().unwrap_or(0.0);
        assert!(giants > 60.0, "Giants only won {}%", giants);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let config = ProjectionConfig::default().with_cutoff_week(0).with_trials(500).with_seed(3);
        let result = estimate_champions(&League::bootstrap(), &config).unwrap();

        let total: f64 = result.values().sum();
        assert!((total - 100.0).abs() < 1e-6, "total {}", total);
        assert!(result.values().all(|p| *p > 0.0 && *p <= 100.0));
    }

    #[test]
    fn test_same_seed_same_estimate() {
        let config = ProjectionConfig::default().with_cutoff_week(0).with_trials(200).with_seed(99);
        let league = League::bootstrap();
        let first = estimate_champions(&league, &config).unwrap();
        let second = estimate_champions(&league, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_league_left_untouched() {
        let league = decided_league();
        let before = league.clone();

        let config = ProjectionConfig::default().with_trials(100);
        estimate_champions(&league, &config).unwrap();

        assert_eq!(league, before);
        assert!(league.matches.iter().filter(|m| m.week > 4).all(|m| !m.is_played()));
    }

    #[test]
    fn test_decided_season_has_one_champion() {
        let config = ProjectionConfig::default().with_trials(200);
        let result = estimate_champions(&decided_league(), &config).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result["Lions"], 100.0);
    }

    #[test]
    fn test_cutoff_keeps_early_weeks_unplayed() {
        let league = League::bootstrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let standings = project_final_table(&league, 4, &mut rng).unwrap();

        // only weeks 5 and 6 are projected: two matches per team
        assert_eq!(standings.len(), 4);
        assert!(standings.iter().all(|s| s.entry.matches_played == 2));
        assert!(standings
            .iter()
            .all(|s| s.record.wins + s.record.draws + s.record.losses == 2));
        assert!(league.matches.iter().all(|m| !m.is_played()));
    }

    #[test]
    fn test_played_matches_are_not_resimulated() {
        let league = decided_league();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let standings = project_final_table(&league, 0, &mut rng).unwrap();

        let lions = standings.iter().find(|s| s.entry.team_id == 1).unwrap();
        assert!(lions.record.wins >= 4);
        assert!(standings.iter().all(|s| s.entry.matches_played == 6));
    }

    #[test]
    fn test_zero_trials_is_empty() {
        let config = ProjectionConfig::default().with_trials(0);
        assert!(estimate_champions(&League::bootstrap(), &config).unwrap().is_empty());
    }

    #[test]
    fn test_empty_league_has_no_champion() {
        let config = ProjectionConfig::default().with_trials(10);
        assert!(estimate_champions(&League::default(), &config).unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = AtomicBool::new(true);
        let config = ProjectionConfig::default().with_trials(100);
        let result = estimate_champions_with_cancel(&League::bootstrap(), &config, &cancel).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_cancelled_mid_run_uses_completed_trials() {
        let cancel = AtomicBool::new(false);
        let config = ProjectionConfig::default().with_cutoff_week(0).with_trials(200_000).with_seed(17);
        let league = League::bootstrap();

        let result = std::thread::scope(|scope| {
            scope.spawn(|| {
                std::thread::sleep(std::time::Duration::from_millis(20));
                cancel.store(true, Ordering::Relaxed);
            });
            estimate_champions_with_cancel(&league, &config, &cancel).unwrap()
        });

        // either nothing ran, or the partial run is normalised over what did
        if !result.is_empty() {
            let total: f64 = result.values().sum();
            assert!((total - 100.0).abs() < 1e-6, "total {}", total);
        }
        assert!(cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn test_invalid_league_is_rejected() {
        let league = League::new(vec![Team::new(1, "Solo", 10)], vec![Match::new(1, 1, 2, 5)]);
        let err = estimate_champions(&league, &ProjectionConfig::default()).unwrap_err();
        assert!(matches!(err, LeagueError::UnknownTeam(2)));
    }
}
