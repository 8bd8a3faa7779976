//! League Core - round-robin season simulation and standings engine.
//!
//! This library provides the match outcome model, the league table
//! calculator and a Monte Carlo projection of championship odds, with
//! optional Python bindings via PyO3 (feature `python`).

pub mod constants;
pub mod error;
pub mod fixture;
pub mod league;
pub mod outcome;
pub mod projection;
pub mod service;
pub mod standings;
pub mod team;

#[cfg(feature = "python")]
mod python;

pub use constants::{CUTOFF_WEEK, DEFAULT_TRIALS, HOME_ADVANTAGE};
pub use error::{LeagueError, Result};
pub use fixture::{Match, MatchId, Score};
pub use league::League;
pub use outcome::{simulate_fixture, simulate_match, RandomSource};
pub use projection::{
    estimate_champions, estimate_champions_with_cancel, is_projectable, project_final_table,
    ProjectionConfig,
};
pub use service::{
    FinalTableEstimate, LeagueRepository, LeagueService, MemoryRepository, ResultSink, WeekReport,
};
pub use standings::{
    compute_records, compute_standings_with_record, compute_table, league_standings,
    LeagueTableEntry, Record, Standing,
};
pub use team::{Team, TeamId};
