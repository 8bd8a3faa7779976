/// Multiplier applied to the home side's strength
pub const HOME_ADVANTAGE: f64 = 1.1;

/// Expected goals are a team's share of combined strength scaled into this band
pub const GOAL_BAND: f64 = 3.0;

/// One-in-N chance that a side's expected goal count drops by one
pub const GOAL_DECREMENT_ODDS: u32 = 4;

/// One-in-N chance that a side scores an extra goal
pub const GOAL_INCREMENT_ODDS: u32 = 10;

/// Points awarded for a win
pub const WIN_POINTS: u32 = 3;

/// Points awarded to each side for a draw
pub const DRAW_POINTS: u32 = 1;

/// Weeks up to and including this one are treated as known results when projecting
pub const CUTOFF_WEEK: u32 = 4;

/// Number of Monte Carlo trials used when the caller does not choose one
pub const DEFAULT_TRIALS: usize = 1000;
