//! Global rankings over all players, plus the most frequent pairs.

use std::collections::HashMap;

use tracing::debug;

use super::pairing::count_pair;
use super::snapshot::Snapshot;
use crate::models::{
    InfoTag, Leaderboards, PairEntry, PlayerId, RankedPlayer, Role, RoleCountEntry,
};

/// Per-player counters every ranking is sorted from.
#[derive(Debug, Clone)]
struct Tally {
    player_id: PlayerId,
    name: String,
    games: u32,
    wins: u32,
    villains: u32,
    kinds: u32,
    villain_wins: u32,
    kind_wins: u32,
    pire: u32,
    meilleur: u32,
}

impl Tally {
    fn new(player_id: PlayerId, name: &str) -> Self {
        Self {
            player_id,
            name: name.to_string(),
            games: 0,
            wins: 0,
            villains: 0,
            kinds: 0,
            villain_wins: 0,
            kind_wins: 0,
            pire: 0,
            meilleur: 0,
        }
    }
}

fn tally_players(snapshot: &Snapshot) -> Vec<Tally> {
    snapshot
        .players()
        .iter()
        .map(|player| {
            let mut tally = Tally::new(player.id, &player.name);
            for (game, seat) in snapshot.seats_of(player.id) {
                let won = snapshot.winner(game) == Some(seat.role);
                tally.games += 1;
                tally.wins += u32::from(won);
                match seat.role {
                    Role::Villain => {
                        tally.villains += 1;
                        tally.villain_wins += u32::from(won);
                    }
                    Role::Kind => {
                        tally.kinds += 1;
                        tally.kind_wins += u32::from(won);
                    }
                }
                match seat.info {
                    InfoTag::Pire => tally.pire += 1,
                    InfoTag::Meilleur => tally.meilleur += 1,
                    InfoTag::Neutre => {}
                }
            }
            tally
        })
        .collect()
}

/// Players by descending `key`, ties kept in name order.
fn ranked<F>(tallies: &[Tally], key: F, limit: Option<usize>) -> Vec<RankedPlayer>
where
    F: Fn(&Tally) -> u32,
{
    let mut sorted: Vec<&Tally> = tallies.iter().collect();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)));
    sorted
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|t| RankedPlayer {
            player_id: t.player_id,
            name: t.name.clone(),
            count: key(t),
        })
        .collect()
}

fn by_role_count(tallies: &[Tally], role: Role) -> Vec<RoleCountEntry> {
    let mut sorted: Vec<&Tally> = tallies.iter().collect();
    let count = |t: &Tally| match role {
        Role::Villain => t.villains,
        Role::Kind => t.kinds,
    };
    sorted.sort_by(|a, b| count(b).cmp(&count(a)));
    sorted
        .into_iter()
        .map(|t| RoleCountEntry {
            player_id: t.player_id,
            name: t.name.clone(),
            villains: t.villains,
            kinds: t.kinds,
        })
        .collect()
}

/// Most frequent unordered pairs, lower id first, annotated with each
/// side's individual wins over the shared games.
pub fn top_pairs(snapshot: &Snapshot, limit: usize) -> Vec<PairEntry> {
    let mut shared: HashMap<(PlayerId, PlayerId), u32> = HashMap::new();
    for (_, roster) in snapshot.rosters() {
        let mut seated: Vec<PlayerId> = roster.keys().copied().collect();
        seated.sort();
        for (i, &a) in seated.iter().enumerate() {
            for &b in &seated[i + 1..] {
                *shared.entry((a, b)).or_default() += 1;
            }
        }
    }

    let mut pairs: Vec<((PlayerId, PlayerId), u32)> = shared.into_iter().collect();
    pairs.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));

    pairs
        .into_iter()
        .take(limit)
        .map(|((a, b), games)| {
            let counts = count_pair(snapshot, a, b);
            PairEntry {
                a,
                a_name: snapshot.name_of(a),
                b,
                b_name: snapshot.name_of(b),
                games,
                wins_a: counts.individual_wins_first,
                wins_b: counts.individual_wins_second,
            }
        })
        .collect()
}

/// Build every leaderboard. Truncated lists keep `top_n` entries.
pub fn compute_leaderboards(snapshot: &Snapshot, top_n: usize) -> Leaderboards {
    let tallies = tally_players(snapshot);
    let top = Some(top_n);

    let boards = Leaderboards {
        by_wins: ranked(&tallies, |t| t.wins, None),
        by_role_villain: by_role_count(&tallies, Role::Villain),
        by_role_kind: by_role_count(&tallies, Role::Kind),
        by_most_played: ranked(&tallies, |t| t.games, top),
        by_villain_wins: ranked(&tallies, |t| t.villain_wins, top),
        by_kind_wins: ranked(&tallies, |t| t.kind_wins, top),
        by_info_pire: ranked(&tallies, |t| t.pire, top),
        by_info_meilleur: ranked(&tallies, |t| t.meilleur, top),
        top_pairs: top_pairs(snapshot, top_n),
    };

    debug!(
        "Leaderboards over {} players, {} participations",
        tallies.len(),
        snapshot.participation_count()
    );
    boards
}

/// Every player with their number of games, most active first, then by name.
pub fn compute_player_directory(snapshot: &Snapshot) -> Vec<RankedPlayer> {
    ranked(&tally_players(snapshot), |t| t.games, None)
}
