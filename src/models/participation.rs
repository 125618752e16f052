//! Participation model: one player's seat in one game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Game, GameId, InfoTag, ParticipationId, PlayerId, Role};

/// Join between a player and a game, carrying the player's role and tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub id: ParticipationId,

    pub player_id: PlayerId,

    pub game_id: GameId,

    /// Side played in this game
    pub role: Role,

    /// Secondary performance tag
    #[serde(default)]
    pub info: InfoTag,

    pub created_at: DateTime<Utc>,
}

impl Participation {
    /// Create a new Participation with the default tag.
    pub fn new(id: ParticipationId, player_id: PlayerId, game_id: GameId, role: Role) -> Self {
        Self {
            id,
            player_id,
            game_id,
            role,
            info: InfoTag::default(),
            created_at: Utc::now(),
        }
    }

    /// Builder method to set the tag.
    pub fn with_info(mut self, info: InfoTag) -> Self {
        self.info = info;
        self
    }

    /// A participation wins when its role is the game's winning role.
    pub fn is_win(&self, game: &Game) -> bool {
        game.is_won_by(self.role)
    }
}
