use serde::{Deserialize, Serialize};

pub type TeamId = u32;

/// A club in the league.
///
/// Only identity and rating live here. Points, goals and games played are
/// always derived from match history by the standings calculator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,

    pub name: String,

    /// Rating that biases simulated scoring (higher scores more)
    pub strength: u32,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>, strength: u32) -> Self {
        Team {
            id,
            name: name.into(),
            strength,
        }
    }
}
