use serde::{Deserialize, Serialize};

use crate::team::TeamId;

pub type MatchId = u32;

/// Final score of a played match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Score { home, away }
    }
}

/// A scheduled fixture between two teams in a given week.
///
/// A match is played exactly when it carries a score, so the
/// "goals present iff played" rule cannot be broken by a mutator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub week: u32,

    #[serde(default)]
    pub score: Option<Score>,
}

impl Match {
    /// Create an unplayed fixture
    pub fn new(id: MatchId, home_team_id: TeamId, away_team_id: TeamId, week: u32) -> Self {
        Match {
            id,
            home_team_id,
            away_team_id,
            week,
            score: None,
        }
    }

    /// Create a fixture that already has a result
    pub fn played(
        id: MatchId,
        home_team_id: TeamId,
        away_team_id: TeamId,
        week: u32,
        home_goals: u32,
        away_goals: u32,
    ) -> Self {
        Match {
            score: Some(Score::new(home_goals, away_goals)),
            ..Match::new(id, home_team_id, away_team_id, week)
        }
    }

    pub fn is_played(&self) -> bool {
        self.score.is_some()
    }

    pub fn home_goals(&self) -> Option<u32> {
        self.score.map(|s| s.home)
    }

    pub fn away_goals(&self) -> Option<u32> {
        self.score.map(|s| s.away)
    }

    /// Set the result and mark the match played
    pub fn record(&mut self, home_goals: u32, away_goals: u32) {
        self.score = Some(Score::new(home_goals, away_goals));
    }

    /// Clear the result and mark the match unplayed
    pub fn clear(&mut self) {
        self.score = None;
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}
