//! One player's page: personal totals, info tag breakdown, and the
//! players they most often share a table with.

use std::collections::HashMap;

use tracing::debug;

use super::pairing::count_pair;
use super::snapshot::Snapshot;
use super::{percentage_or_zero, StatsError};
use crate::models::{
    InfoBreakdown, PartnerStat, PartnerSummary, PlayerId, PlayerTotals, Role,
};

/// Build the partner summary of `player`, listing at most `limit` partners.
pub fn compute_partner_summary(
    snapshot: &Snapshot,
    player: PlayerId,
    limit: usize,
) -> Result<PartnerSummary, StatsError> {
    let focal = snapshot
        .player(player)
        .ok_or(StatsError::PlayerNotFound(player))?;

    let partners: Vec<PartnerStat> = rank_partners(snapshot, player, limit)
        .into_iter()
        .map(|partner| partner_stat(snapshot, player, partner))
        .collect();

    debug!(
        "Partner summary for {}: {} partners",
        focal.name,
        partners.len()
    );

    Ok(PartnerSummary {
        player_id: player,
        name: focal.name.clone(),
        totals: player_totals(snapshot, player),
        partners,
        info: info_breakdown(snapshot, player),
    })
}

/// Other players who shared a game with `player`, most shared games first.
///
/// Equal counts are ordered by ascending id.
pub fn rank_partners(snapshot: &Snapshot, player: PlayerId, limit: usize) -> Vec<PlayerId> {
    let mut shared: HashMap<PlayerId, u32> = HashMap::new();
    for &game in snapshot.game_ids(player) {
        let Some(roster) = snapshot.roster(game) else {
            continue;
        };
        for &other in roster.keys().filter(|&&other| other != player) {
            *shared.entry(other).or_default() += 1;
        }
    }

    let mut ranked: Vec<(PlayerId, u32)> = shared.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(id, _)| id).collect()
}

fn partner_stat(snapshot: &Snapshot, player: PlayerId, partner: PlayerId) -> PartnerStat {
    let counts = count_pair(snapshot, player, partner);

    // zero rather than "no data" when they never shared a side
    let win_pct = percentage_or_zero(counts.wins_same_team(), counts.together_same_team());

    PartnerStat {
        player_id: partner,
        name: snapshot.name_of(partner),
        together_count: counts.together,
        together_villain: counts.together_villain,
        together_kind: counts.together_kind,
        wins_both_villain: counts.wins_both_villain,
        wins_both_kind: counts.wins_both_kind,
        losses_both_villain: counts.together_villain - counts.wins_both_villain,
        losses_both_kind: counts.together_kind - counts.wins_both_kind,
        wins_same_team: counts.wins_same_team(),
        together_same_team: counts.together_same_team(),
        win_pct,
    }
}

/// Games, wins and losses of `player`, overall and per role.
pub fn player_totals(snapshot: &Snapshot, player: PlayerId) -> PlayerTotals {
    let mut totals = PlayerTotals::default();

    for (game, seat) in snapshot.seats_of(player) {
        let winner = snapshot.winner(game);
        let won = winner == Some(seat.role);
        let lost_to_other_side = winner == Some(seat.role.opponent());

        totals.games += 1;
        totals.wins += u32::from(won);
        match seat.role {
            Role::Villain => {
                totals.villain_games += 1;
                totals.wins_villain += u32::from(won);
                totals.losses_villain += u32::from(lost_to_other_side);
            }
            Role::Kind => {
                totals.kind_games += 1;
                totals.wins_kind += u32::from(won);
                totals.losses_kind += u32::from(lost_to_other_side);
            }
        }
    }

    totals.losses = totals.games - totals.wins;
    totals.pct_villain = percentage_or_zero(totals.villain_games, totals.games);
    totals.pct_kind = percentage_or_zero(totals.kind_games, totals.games);
    totals.win_pct = percentage_or_zero(totals.wins, totals.games);
    totals.pct_wins_villain = percentage_or_zero(totals.wins_villain, totals.villain_games);
    totals.pct_wins_kind = percentage_or_zero(totals.wins_kind, totals.kind_games);
    totals
}

/// Info tags of `player` overall, in won games, and in every other game.
pub fn info_breakdown(snapshot: &Snapshot, player: PlayerId) -> InfoBreakdown {
    let mut breakdown = InfoBreakdown::default();

    for (game, seat) in snapshot.seats_of(player) {
        breakdown.overall.record(seat.info);
        if snapshot.winner(game) == Some(seat.role) {
            breakdown.wins.record(seat.info);
        } else {
            breakdown.losses.record(seat.info);
        }
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::{id, play, play_tagged, snapshot};
    use crate::models::InfoCounts;
    use crate::storage::Ledger;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_outcomes_give_fifty_percent() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("P", "kind"), ("Q", "kind")], Some("kind"));
        play(&mut ledger, &[("P", "kind"), ("Q", "kind")], Some("villain"));

        let snap = snapshot(&ledger);
        let summary = compute_partner_summary(&snap, id(&ledger, "P"), 20).unwrap();

        assert_eq!(summary.partners.len(), 1);
        let q = &summary.partners[0];
        assert_eq!(q.name, "Q");
        assert_eq!(q.together_count, 2);
        assert_eq!(q.together_kind, 2);
        assert_eq!(q.wins_both_kind, 1);
        assert_eq!(q.losses_both_kind, 1);
        assert_eq!(q.win_pct, 50.0);
    }

    #[test]
    fn test_never_same_side_is_zero_not_undefined() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("P", "kind"), ("Q", "villain")], Some("kind"));

        let snap = snapshot(&ledger);
        let summary = compute_partner_summary(&snap, id(&ledger, "P"), 20).unwrap();
        let q = &summary.partners[0];

        assert_eq!(q.together_count, 1);
        assert_eq!(q.together_same_team, 0);
        assert_eq!(q.win_pct, 0.0);
    }

    #[test]
    fn test_player_without_games() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("A", "kind"), ("B", "villain")], Some("kind"));
        let lonely = ledger.add_player("Lonely").unwrap();

        let summary = compute_partner_summary(&snapshot(&ledger), lonely, 20).unwrap();

        assert!(summary.partners.is_empty());
        assert_eq!(summary.totals, PlayerTotals::default());
        assert_eq!(summary.info, InfoBreakdown::default());
    }

    #[test]
    fn test_unknown_player_is_not_found() {
        let ledger = Ledger::new();
        let result = compute_partner_summary(&snapshot(&ledger), PlayerId::new(42), 20);
        assert!(matches!(result, Err(StatsError::PlayerNotFound(_))));
    }

    #[test]
    fn test_partners_ranked_by_shared_games_and_limited() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("P", "kind"), ("A", "kind"), ("B", "kind")], Some("kind"));
        play(&mut ledger, &[("P", "kind"), ("B", "villain"), ("C", "kind")], Some("kind"));
        play(&mut ledger, &[("P", "villain"), ("B", "villain"), ("C", "kind")], Some("kind"));
        play(&mut ledger, &[("A", "villain"), ("C", "villain")], Some("kind"));

        let snap = snapshot(&ledger);
        let p = id(&ledger, "P");

        let all = compute_partner_summary(&snap, p, 20).unwrap();
        let names: Vec<&str> = all.partners.iter().map(|q| q.name.as_str()).collect();
        // B: 3 shared, C: 2, A: 1
        assert_eq!(names, vec!["B", "C", "A"]);

        let top = compute_partner_summary(&snap, p, 2).unwrap();
        assert_eq!(top.partners.len(), 2);
        assert_eq!(top.partners[1].name, "C");
    }

    #[test]
    fn test_ties_ordered_by_id() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("P", "kind"), ("Z", "kind"), ("Y", "kind")], Some("kind"));

        let snap = snapshot(&ledger);
        let ranked = rank_partners(&snap, id(&ledger, "P"), 20);
        assert_eq!(ranked, vec![id(&ledger, "Z"), id(&ledger, "Y")]);
    }

    #[test]
    fn test_partner_wins_never_exceed_appearances() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("P", "villain"), ("A", "villain"), ("B", "kind")], Some("villain"));
        play(&mut ledger, &[("P", "villain"), ("A", "villain"), ("B", "villain")], Some("kind"));
        play(&mut ledger, &[("P", "kind"), ("A", "kind"), ("B", "kind")], None);
        play(&mut ledger, &[("P", "kind"), ("B", "kind")], Some("kind"));

        let snap = snapshot(&ledger);
        let summary = compute_partner_summary(&snap, id(&ledger, "P"), 20).unwrap();

        for q in &summary.partners {
            assert!(q.wins_both_villain <= q.together_villain);
            assert!(q.wins_both_kind <= q.together_kind);
            assert!(q.together_same_team <= q.together_count);
            assert_eq!(
                q.losses_both_villain + q.wins_both_villain,
                q.together_villain
            );
        }
    }

    #[test]
    fn test_player_totals() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("P", "villain")], Some("villain"));
        play(&mut ledger, &[("P", "villain")], Some("kind"));
        play(&mut ledger, &[("P", "kind")], Some("kind"));
        play(&mut ledger, &[("P", "kind")], None);

        let snap = snapshot(&ledger);
        let totals = player_totals(&snap, id(&ledger, "P"));

        assert_eq!(totals.games, 4);
        assert_eq!(totals.villain_games, 2);
        assert_eq!(totals.kind_games, 2);
        assert_eq!(totals.villain_games + totals.kind_games, totals.games);
        assert_eq!(totals.pct_villain, 50.0);
        assert_eq!(totals.wins, 2);
        assert_eq!(totals.losses, 2);
        assert_eq!(totals.win_pct, 50.0);
        assert_eq!(totals.wins_villain, 1);
        assert_eq!(totals.losses_villain, 1);
        assert_eq!(totals.wins_kind, 1);
        // the pending game is not a kind loss
        assert_eq!(totals.losses_kind, 0);
        assert_eq!(totals.pct_wins_kind, 50.0);
    }

    #[test]
    fn test_win_pct_rounds_to_one_decimal() {
        let mut ledger = Ledger::new();
        play(&mut ledger, &[("P", "kind")], Some("kind"));
        play(&mut ledger, &[("P", "kind")], Some("kind"));
        play(&mut ledger, &[("P", "kind")], Some("villain"));

        let totals = player_totals(&snapshot(&ledger), id(&ledger, "P"));
        assert_eq!(totals.win_pct, 66.7);
    }

    #[test]
    fn test_info_breakdown() {
        let mut ledger = Ledger::new();
        play_tagged(&mut ledger, &[("P", "kind", "meilleur")], Some("kind"));
        play_tagged(&mut ledger, &[("P", "kind", "pire")], Some("villain"));
        play_tagged(&mut ledger, &[("P", "villain", "pire")], None);
        play_tagged(&mut ledger, &[("P", "villain", "neutre")], Some("villain"));

        let info = info_breakdown(&snapshot(&ledger), id(&ledger, "P"));

        assert_eq!(
            info.overall,
            InfoCounts {
                pire: 2,
                neutre: 1,
                meilleur: 1
            }
        );
        assert_eq!(
            info.wins,
            InfoCounts {
                pire: 0,
                neutre: 1,
                meilleur: 1
            }
        );
        assert_eq!(
            info.losses,
            InfoCounts {
                pire: 2,
                neutre: 0,
                meilleur: 0
            }
        );
        assert_eq!(info.wins.total() + info.losses.total(), info.overall.total());
    }
}
