//! Pairwise cross-tab: for every two players, how often their shared side
//! won when both were kind and when both were villain.

use std::collections::BTreeMap;

use tracing::debug;

use super::pairing::{count_pair, PairCounts};
use super::snapshot::Snapshot;
use crate::models::{CrossTab, CrossTabCell, CrossTabRow, PlayerId, Role, RowExtrema};

/// Build the full cross-tab.
///
/// Each unordered pair is counted once and mirrored, so the matrix is
/// symmetric by construction. Self cells are present with `total == 0`
/// and no percentages.
pub fn compute_cross_tab(snapshot: &Snapshot) -> CrossTab {
    let order: Vec<PlayerId> = snapshot.players().iter().map(|p| p.id).collect();

    let mut cells: BTreeMap<PlayerId, BTreeMap<PlayerId, CrossTabCell>> = order
        .iter()
        .map(|&id| (id, BTreeMap::from([(id, CrossTabCell::default())])))
        .collect();

    for (i, &a) in order.iter().enumerate() {
        for &b in &order[i + 1..] {
            let cell = cell_from_counts(&count_pair(snapshot, a, b));
            cells.entry(a).or_default().insert(b, cell);
            cells.entry(b).or_default().insert(a, cell);
        }
    }

    let rows = order
        .iter()
        .map(|&id| {
            let row_cells = cells.remove(&id).unwrap_or_default();
            let row = CrossTabRow {
                player_id: id,
                name: snapshot.name_of(id),
                kind_extrema: row_extrema(&row_cells, |c| c.kind_pct),
                villain_extrema: row_extrema(&row_cells, |c| c.villain_pct),
                cells: row_cells,
            };
            (id, row)
        })
        .collect();

    debug!("Computed cross-tab for {} players", order.len());
    CrossTab { order, rows }
}

fn cell_from_counts(counts: &PairCounts) -> CrossTabCell {
    if counts.together == 0 {
        return CrossTabCell::default();
    }
    CrossTabCell {
        total: counts.together,
        kind_pct: counts.shared_role_pct(Role::Kind),
        villain_pct: counts.shared_role_pct(Role::Villain),
    }
}

/// Highest and lowest defined values in a row, with every column that
/// reaches them (ascending ids). `None` when no value is defined.
pub fn row_extrema<F>(cells: &BTreeMap<PlayerId, CrossTabCell>, value: F) -> Option<RowExtrema>
where
    F: Fn(&CrossTabCell) -> Option<f64>,
{
    let defined: Vec<(PlayerId, f64)> = cells
        .iter()
        .filter_map(|(&id, cell)| value(cell).map(|v| (id, v)))
        .collect();

    let max_value = defined.iter().map(|&(_, v)| v).max_by(f64::total_cmp)?;
    let min_value = defined.iter().map(|&(_, v)| v).min_by(f64::total_cmp)?;

    let ids_at = |target: f64| -> Vec<PlayerId> {
        defined
            .iter()
            .filter(|&&(_, v)| v == target)
            .map(|&(id, _)| id)
            .collect()
    };

    Some(RowExtrema {
        max_value,
        max_ids: ids_at(max_value),
        min_value,
        min_ids: ids_at(min_value),
    })
}
