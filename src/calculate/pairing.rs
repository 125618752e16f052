//! Counting primitives for two players over the games they shared.
//!
//! Both the cross-tab and the partner summary reduce a pair of players to
//! a [`PairCounts`]; the leaderboard's top pairs reuse the individual win
//! counters.

use crate::models::{PlayerId, Role};

use super::snapshot::Snapshot;
use super::percentage;

/// Counters over the games two players (first, second) both took part in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCounts {
    /// Games both played
    pub together: u32,

    /// Games where both were villain
    pub together_villain: u32,

    /// Games where both were kind
    pub together_kind: u32,

    /// Games where both were villain and villain won
    pub wins_both_villain: u32,

    /// Games where both were kind and kind won
    pub wins_both_kind: u32,

    /// Shared games the first player won, whatever the second one played
    pub individual_wins_first: u32,

    /// Shared games the second player won, whatever the first one played
    pub individual_wins_second: u32,
}

impl PairCounts {
    /// Games where both held `role`.
    pub fn together_as(&self, role: Role) -> u32 {
        match role {
            Role::Villain => self.together_villain,
            Role::Kind => self.together_kind,
        }
    }

    /// Games where both held `role` and `role` won.
    pub fn wins_both_as(&self, role: Role) -> u32 {
        match role {
            Role::Villain => self.wins_both_villain,
            Role::Kind => self.wins_both_kind,
        }
    }

    pub fn together_same_team(&self) -> u32 {
        self.together_villain + self.together_kind
    }

    pub fn wins_same_team(&self) -> u32 {
        self.wins_both_villain + self.wins_both_kind
    }

    /// Win rate when both held `role`; `None` if they never did.
    pub fn shared_role_pct(&self, role: Role) -> Option<f64> {
        percentage(self.wins_both_as(role), self.together_as(role))
    }
}

/// Count what `first` and `second` did together.
///
/// Walks the smaller of the two game sets and probes the other, reading
/// roles and winners from the snapshot's per-game maps.
pub fn count_pair(snapshot: &Snapshot, first: PlayerId, second: PlayerId) -> PairCounts {
    let mut counts = PairCounts::default();
    if first == second {
        return counts;
    }

    let games_first = snapshot.game_ids(first);
    let games_second = snapshot.game_ids(second);
    let (small, large) = if games_first.len() <= games_second.len() {
        (games_first, games_second)
    } else {
        (games_second, games_first)
    };

    for &game in small.iter().filter(|g| large.contains(*g)) {
        let (Some(a), Some(b)) = (snapshot.seat(first, game), snapshot.seat(second, game)) else {
            continue;
        };
        let winner = snapshot.winner(game);

        counts.together += 1;

        if a.role == b.role {
            let won = winner == Some(a.role);
            match a.role {
                Role::Villain => {
                    counts.together_villain += 1;
                    counts.wins_both_villain += u32::from(won);
                }
                Role::Kind => {
                    counts.together_kind += 1;
                    counts.wins_both_kind += u32::from(won);
                }
            }
        }

        if winner == Some(a.role) {
            counts.individual_wins_first += 1;
        }
        if winner == Some(b.role) {
            counts.individual_wins_second += 1;
        }
    }

    counts
}
