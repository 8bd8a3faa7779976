use thiserror::Error;

use crate::fixture::MatchId;
use crate::team::TeamId;

#[derive(Error, Debug)]
pub enum LeagueError {
    #[error("Both strengths are zero (home {home}, away {away})")]
    DegenerateStrength { home: u32, away: u32 },

    #[error("Unknown team: {0}")]
    UnknownTeam(TeamId),

    #[error("Unknown match: {0}")]
    UnknownMatch(MatchId),

    #[error("Duplicate team id: {0}")]
    DuplicateTeam(TeamId),

    #[error("Duplicate match id: {0}")]
    DuplicateMatch(MatchId),

    #[error("Match {match_id} has team {team_id} playing itself")]
    SelfMatch { match_id: MatchId, team_id: TeamId },

    #[error("Match {match_id} has week 0")]
    InvalidWeek { match_id: MatchId },

    #[error("Invalid setting {name}: {value:?}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LeagueError {
    /// True for caller errors: the league or the inputs broke a precondition.
    pub fn is_precondition(&self) -> bool {
        match self {
            LeagueError::DegenerateStrength { .. } => true,
            LeagueError::UnknownTeam(_) => true,
            LeagueError::UnknownMatch(_) => true,
            LeagueError::DuplicateTeam(_) => true,
            LeagueError::DuplicateMatch(_) => true,
            LeagueError::SelfMatch { .. } => true,
            LeagueError::InvalidWeek { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LeagueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(LeagueError::UnknownTeam(7).is_precondition());
        assert!(LeagueError::DegenerateStrength { home: 0, away: 0 }.is_precondition());
        assert!(!LeagueError::Repository("down".to_string()).is_precondition());
    }

    #[test]
    fn test_display() {
        let err = LeagueError::SelfMatch { match_id: 3, team_id: 1 };
        assert_eq!(err.to_string(), "Match 3 has team 1 playing itself");
    }
}
