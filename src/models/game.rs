//! Game session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GameId, PlayerId, Role};

/// One session of the party game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier
    pub id: GameId,

    /// Player running the session, cleared when that player is deleted
    #[serde(default)]
    pub master: Option<PlayerId>,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,

    /// Side that won; normally set when the game ends
    #[serde(default)]
    pub winner_role: Option<Role>,
}

impl Game {
    /// Create a game that has not started yet.
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            master: None,
            started_at: None,
            ended_at: None,
            winner_role: None,
        }
    }

    /// Builder method to record the winning side and end the game now.
    pub fn with_winner(mut self, winner: Role) -> Self {
        let now = Utc::now();
        self.started_at.get_or_insert(now);
        self.ended_at = Some(now);
        self.winner_role = Some(winner);
        self
    }

    /// Started and not ended.
    pub fn is_active(&self) -> bool {
        self.started_at.is_some() && self.ended_at.is_none()
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Whether a participant on `role` won this game.
    pub fn is_won_by(&self, role: Role) -> bool {
        self.winner_role == Some(role)
    }
}
