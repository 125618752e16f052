//! Record keeping for players, games and participations.
//!
//! - [`DataSource`]: the read-only query surface the statistics engine
//!   consumes
//! - [`Ledger`]: in-memory records with the write-time validation rules
//! - JSONL files under `<data_dir>/ledger/` as the on-disk form

pub mod jsonl;
pub mod ledger;

pub use jsonl::{EntityType, JsonlReader, JsonlSource, JsonlWriter};
pub use ledger::{Ledger, SeatAssignment};

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Game, GameId, InfoTag, Participation, Player, PlayerId, Role};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed line {line} in {path:?}: {source}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("No player named {0:?}")]
    PlayerNameNotFound(String),

    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Game {0} has ended; use edit mode to change its participants")]
    GameEnded(GameId),

    #[error("Player name must not be empty")]
    EmptyName,

    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u64 },

    #[error("Player {player} already takes part in game {game}")]
    DuplicateParticipation { player: PlayerId, game: GameId },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn ledger_dir(&self) -> PathBuf {
        self.data_dir.join("ledger")
    }

    /// Path of the JSONL file holding `entity`.
    pub fn entity_path(&self, entity: EntityType) -> PathBuf {
        self.ledger_dir().join(entity.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Restricts a participation query. Empty fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipationFilter {
    pub player: Option<PlayerId>,
    pub game: Option<GameId>,
    pub role: Option<Role>,
    pub info: Option<InfoTag>,
}

impl ParticipationFilter {
    /// Match every participation.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_player(player: PlayerId) -> Self {
        Self {
            player: Some(player),
            ..Self::default()
        }
    }

    pub fn for_game(game: GameId) -> Self {
        Self {
            game: Some(game),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_info(mut self, info: InfoTag) -> Self {
        self.info = Some(info);
        self
    }

    pub fn matches(&self, p: &Participation) -> bool {
        self.player.map_or(true, |id| p.player_id == id)
            && self.game.map_or(true, |id| p.game_id == id)
            && self.role.map_or(true, |role| p.role == role)
            && self.info.map_or(true, |info| p.info == info)
    }
}

/// Read-only access to the current records.
pub trait DataSource {
    fn list_players(&self) -> Result<Vec<Player>, StorageError>;

    fn list_games(&self) -> Result<Vec<Game>, StorageError>;

    fn list_participations(
        &self,
        filter: &ParticipationFilter,
    ) -> Result<Vec<Participation>, StorageError>;

    /// Count participations matching `filter`.
    fn count_participations(&self, filter: &ParticipationFilter) -> Result<usize, StorageError> {
        Ok(self.list_participations(filter)?.len())
    }

    /// Count participations matching `filter`, grouped by player.
    fn count_participations_by_player(
        &self,
        filter: &ParticipationFilter,
    ) -> Result<BTreeMap<PlayerId, usize>, StorageError> {
        let mut counts = BTreeMap::new();
        for p in self.list_participations(filter)? {
            *counts.entry(p.player_id).or_default() += 1;
        }
        Ok(counts)
    }
}
