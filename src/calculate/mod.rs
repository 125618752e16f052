//! Statistics calculation engine.
//!
//! Computes derived reports from the stored ledger:
//! - Pairwise cross-tab of shared-side win rates
//! - Per-player partner summaries with totals and info tags
//! - Leaderboards and most frequent pairs
//! - Single game detail and the player directory
//!
//! Every report is computed from a fresh [`Snapshot`] of a [`DataSource`];
//! nothing is cached between calls.

pub mod cross_tab;
pub mod game_detail;
pub mod leaderboard;
pub mod pairing;
pub mod partners;
pub mod snapshot;

pub use pairing::{count_pair, PairCounts};
pub use snapshot::{Seat, Snapshot};

use thiserror::Error;
use tracing::info;

use crate::config::StatsConfig;
use crate::models::{
    CrossTab, GameDetail, GameId, Leaderboards, ParticipationId, PartnerSummary, PlayerId,
    RankedPlayer,
};
use crate::storage::{DataSource, StorageError};

/// Errors raised while computing a report.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Player id {0} appears more than once")]
    DuplicatePlayer(PlayerId),

    #[error("Game id {0} appears more than once")]
    DuplicateGame(GameId),

    #[error("Participation {participation} references unknown player {player}")]
    UnknownPlayer {
        participation: ParticipationId,
        player: PlayerId,
    },

    #[error("Participation {participation} references unknown game {game}")]
    UnknownGame {
        participation: ParticipationId,
        game: GameId,
    },

    #[error("Player {player} is seated twice in game {game}")]
    DuplicateParticipation { player: PlayerId, game: GameId },
}

/// `part / whole` as a percentage rounded to one decimal, halves to even.
/// `None` when `whole` is zero.
pub fn percentage(part: u32, whole: u32) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    let pct = 100.0 * f64::from(part) / f64::from(whole);
    Some((pct * 10.0).round_ties_even() / 10.0)
}

/// Same as [`percentage`], with zero for an empty denominator.
pub fn percentage_or_zero(part: u32, whole: u32) -> f64 {
    percentage(part, whole).unwrap_or(0.0)
}

// ── Engine ──────────────────────────────────────────────────────

/// Entry point for all reports.
#[derive(Debug, Clone, Default)]
pub struct StatsEngine {
    config: StatsConfig,
}

impl StatsEngine {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Full pairwise cross-tab over every registered player.
    pub fn compute_cross_tab<S>(&self, source: &S) -> Result<CrossTab, StatsError>
    where
        S: DataSource + ?Sized,
    {
        let snapshot = Snapshot::load(source)?;
        let tab = cross_tab::compute_cross_tab(&snapshot);
        info!("Cross-tab computed over {} players", tab.order.len());
        Ok(tab)
    }

    /// Totals, partners and info tags of one player.
    pub fn compute_partner_summary<S>(
        &self,
        source: &S,
        player: PlayerId,
    ) -> Result<PartnerSummary, StatsError>
    where
        S: DataSource + ?Sized,
    {
        let snapshot = Snapshot::load(source)?;
        partners::compute_partner_summary(&snapshot, player, self.config.partner_limit)
    }

    /// All leaderboards, truncated lists limited to `top_n` entries.
    pub fn compute_leaderboards<S>(&self, source: &S) -> Result<Leaderboards, StatsError>
    where
        S: DataSource + ?Sized,
    {
        let snapshot = Snapshot::load(source)?;
        let boards = leaderboard::compute_leaderboards(&snapshot, self.config.top_n);
        info!(
            "Leaderboards computed: {} players, {} pairs",
            boards.by_wins.len(),
            boards.top_pairs.len()
        );
        Ok(boards)
    }

    /// Participants and outcome of one game.
    pub fn compute_game_detail<S>(&self, source: &S, game: GameId) -> Result<GameDetail, StatsError>
    where
        S: DataSource + ?Sized,
    {
        let snapshot = Snapshot::load(source)?;
        game_detail::compute_game_detail(&snapshot, game)
    }

    /// Every player with their number of games, most active first.
    pub fn compute_player_directory<S>(&self, source: &S) -> Result<Vec<RankedPlayer>, StatsError>
    where
        S: DataSource + ?Sized,
    {
        let snapshot = Snapshot::load(source)?;
        Ok(leaderboard::compute_player_directory(&snapshot))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{id, play};
    use super::*;
    use crate::storage::{JsonlSource, Ledger, StorageConfig};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 2), Some(50.0));
        assert_eq!(percentage(1, 3), Some(33.3));
        assert_eq!(percentage(2, 3), Some(66.7));
        assert_eq!(percentage(3, 3), Some(100.0));
        assert_eq!(percentage(0, 4), Some(0.0));
        assert_eq!(percentage(0, 0), None);
    }

    #[test]
    fn test_percentage_rounds_halves_to_even() {
        assert_eq!(percentage(1, 16), Some(6.2));
        assert_eq!(percentage(3, 16), Some(18.8));
        assert_eq!(percentage(5, 16), Some(31.2));
        assert_eq!(percentage(1, 80), Some(1.2));
    }

    #[test]
    fn test_percentage_or_zero() {
        assert_eq!(percentage_or_zero(0, 0), 0.0);
        assert_eq!(percentage_or_zero(1, 8), 12.5);
    }

    #[test]
    fn test_engine_over_ledger() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("A", "kind"), ("B", "kind")], Some("kind"));
        play(&mut ledger, &[("A", "villain"), ("C", "kind")], Some("villain"));

        let engine = StatsEngine::default();
        let a = id(&ledger, "A");

        let tab = engine.compute_cross_tab(&ledger).unwrap();
        assert_eq!(tab.order.len(), 3);

        let summary = engine.compute_partner_summary(&ledger, a).unwrap();
        assert_eq!(summary.totals.games, 2);
        assert_eq!(summary.totals.wins, 2);

        let boards = engine.compute_leaderboards(&ledger).unwrap();
        assert_eq!(boards.by_wins[0].name, "A");

        let directory = engine.compute_player_directory(&ledger).unwrap();
        assert_eq!(directory[0].count, 2);
    }

    #[test]
    fn test_engine_respects_partner_limit() {
        let mut ledger = Ledger::new();
        play(
            &mut ledger,
            &[("A", "kind"), ("B", "kind"), ("C", "kind"), ("D", "villain")],
            Some("kind"),
        );

        let engine = StatsEngine::new(StatsConfig {
            top_n: 20,
            partner_limit: 1,
        });
        let summary = engine
            .compute_partner_summary(&ledger, id(&ledger, "A"))
            .unwrap();
        assert_eq!(summary.partners.len(), 1);
    }

    #[test]
    fn test_engine_reads_saved_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());

        let mut ledger = Ledger::new();
        play(&mut ledger, &[("A", "villain"), ("B", "villain")], Some("villain"));
        ledger.save(&config).unwrap();

        let source = JsonlSource::new(config);
        let engine = StatsEngine::default();
        let tab = engine.compute_cross_tab(&source).unwrap();

        let (a, b) = (id(&ledger, "A"), id(&ledger, "B"));
        assert_eq!(tab.villain_pct(a, b), Some(100.0));
    }

    #[test]
    fn test_engine_reports_missing_entities() {
        let ledger = Ledger::new();
        let engine = StatsEngine::default();

        assert!(matches!(
            engine.compute_partner_summary(&ledger, PlayerId::new(3)),
            Err(StatsError::PlayerNotFound(_))
        ));
        assert!(matches!(
            engine.compute_game_detail(&ledger, GameId::new(3)),
            Err(StatsError::GameNotFound(_))
        ));
    }
}
