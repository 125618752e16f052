//! Derived statistics models.
//!
//! These are the report shapes produced by the calculation engine. Every
//! report is plain data and serializes to JSON for the caller to render.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Game, InfoTag, PlayerId, Role};

/// Count of participations per info tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoCounts {
    pub pire: u32,
    pub neutre: u32,
    pub meilleur: u32,
}

impl InfoCounts {
    /// Count one more participation with `tag`.
    pub fn record(&mut self, tag: InfoTag) {
        match tag {
            InfoTag::Pire => self.pire += 1,
            InfoTag::Neutre => self.neutre += 1,
            InfoTag::Meilleur => self.meilleur += 1,
        }
    }

    pub fn get(&self, tag: InfoTag) -> u32 {
        match tag {
            InfoTag::Pire => self.pire,
            InfoTag::Neutre => self.neutre,
            InfoTag::Meilleur => self.meilleur,
        }
    }

    pub fn total(&self) -> u32 {
        self.pire + self.neutre + self.meilleur
    }
}

/// Info tag distribution for one player: overall, when their side won,
/// and when it did not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoBreakdown {
    pub overall: InfoCounts,
    pub wins: InfoCounts,
    pub losses: InfoCounts,
}

/// Per-player totals shown at the top of a partner summary.
///
/// Percentages are rounded to one decimal and are `0.0` when their
/// denominator is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerTotals {
    /// Games played
    pub games: u32,

    pub villain_games: u32,
    pub kind_games: u32,

    /// Share of games played as villain
    pub pct_villain: f64,

    /// Share of games played as kind
    pub pct_kind: f64,

    pub wins: u32,

    /// Games not won, pending games included
    pub losses: u32,

    pub win_pct: f64,

    pub wins_villain: u32,
    pub wins_kind: u32,

    /// Games played as villain that kind won
    pub losses_villain: u32,

    /// Games played as kind that villain won
    pub losses_kind: u32,

    /// Win rate when playing villain
    pub pct_wins_villain: f64,

    /// Win rate when playing kind
    pub pct_wins_kind: f64,
}

impl PlayerTotals {
    /// Appearances for `role`.
    pub fn games_as(&self, role: Role) -> u32 {
        match role {
            Role::Villain => self.villain_games,
            Role::Kind => self.kind_games,
        }
    }
}

/// Shared-game breakdown between a focal player and one partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerStat {
    pub player_id: PlayerId,
    pub name: String,

    /// Games both played
    pub together_count: u32,

    /// Games where both were villain
    pub together_villain: u32,

    /// Games where both were kind
    pub together_kind: u32,

    pub wins_both_villain: u32,
    pub wins_both_kind: u32,
    pub losses_both_villain: u32,
    pub losses_both_kind: u32,

    /// `wins_both_villain + wins_both_kind`
    pub wins_same_team: u32,

    /// `together_villain + together_kind`
    pub together_same_team: u32,

    /// Same-team win rate; `0.0` when they never shared a side
    pub win_pct: f64,
}

/// Everything shown on one player's page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub totals: PlayerTotals,

    /// Most frequent partners, most shared games first
    pub partners: Vec<PartnerStat>,

    pub info: InfoBreakdown,
}

/// One cell of the pairwise cross-tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossTabCell {
    /// Games both players took part in
    pub total: u32,

    /// Win rate over games where both were kind; `None` when they never were
    pub kind_pct: Option<f64>,

    /// Win rate over games where both were villain; `None` when they never were
    pub villain_pct: Option<f64>,
}

/// Best and worst partners in one cross-tab row, ties kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowExtrema {
    pub max_value: f64,
    pub max_ids: Vec<PlayerId>,
    pub min_value: f64,
    pub min_ids: Vec<PlayerId>,
}

/// One row of the cross-tab: a player against every player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTabRow {
    pub player_id: PlayerId,
    pub name: String,

    /// Cells keyed by column player, self included
    pub cells: BTreeMap<PlayerId, CrossTabCell>,

    pub kind_extrema: Option<RowExtrema>,
    pub villain_extrema: Option<RowExtrema>,
}

/// Pairwise, role-conditioned win-percentage matrix between all players.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    /// Row/column order (players by name)
    pub order: Vec<PlayerId>,

    pub rows: BTreeMap<PlayerId, CrossTabRow>,
}

impl CrossTab {
    /// Get the cell for `(row, col)`.
    pub fn cell(&self, row: PlayerId, col: PlayerId) -> Option<&CrossTabCell> {
        self.rows.get(&row).and_then(|r| r.cells.get(&col))
    }

    /// Games played together; 0 for unknown players.
    pub fn total(&self, row: PlayerId, col: PlayerId) -> u32 {
        self.cell(row, col).map(|c| c.total).unwrap_or(0)
    }

    pub fn kind_pct(&self, row: PlayerId, col: PlayerId) -> Option<f64> {
        self.cell(row, col).and_then(|c| c.kind_pct)
    }

    pub fn villain_pct(&self, row: PlayerId, col: PlayerId) -> Option<f64> {
        self.cell(row, col).and_then(|c| c.villain_pct)
    }

    pub fn row_extrema_kind(&self, row: PlayerId) -> Option<&RowExtrema> {
        self.rows.get(&row).and_then(|r| r.kind_extrema.as_ref())
    }

    pub fn row_extrema_villain(&self, row: PlayerId) -> Option<&RowExtrema> {
        self.rows.get(&row).and_then(|r| r.villain_extrema.as_ref())
    }
}

/// A player and a single counted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub count: u32,
}

/// A player's appearances on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCountEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub villains: u32,
    pub kinds: u32,
}

/// Two players who often play together.
///
/// `wins_a`/`wins_b` count shared games won by each side individually,
/// in any role. This is not the cross-tab's shared-role win rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairEntry {
    pub a: PlayerId,
    pub a_name: String,
    pub b: PlayerId,
    pub b_name: String,
    pub games: u32,
    pub wins_a: u32,
    pub wins_b: u32,
}

/// Global rankings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboards {
    pub by_wins: Vec<RankedPlayer>,
    pub by_role_villain: Vec<RoleCountEntry>,
    pub by_role_kind: Vec<RoleCountEntry>,
    pub by_most_played: Vec<RankedPlayer>,
    pub by_villain_wins: Vec<RankedPlayer>,
    pub by_kind_wins: Vec<RankedPlayer>,
    pub by_info_pire: Vec<RankedPlayer>,
    pub by_info_meilleur: Vec<RankedPlayer>,
    pub top_pairs: Vec<PairEntry>,
}

/// One seat in a game, as shown on the game page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSeat {
    pub player_id: PlayerId,
    pub name: String,
    pub role: Role,
    pub info: InfoTag,
    pub is_winner: bool,
}

/// A game with its participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
    pub game: Game,
    pub master_name: Option<String>,
    pub participants: Vec<GameSeat>,
}
