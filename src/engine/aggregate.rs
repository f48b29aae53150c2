//! Per-run player aggregation.
//!
//! Builds fresh `AggregatedPlayerStat`s from only the rows admitted in this
//! run; prior ledger totals are never reloaded here. Keys are lowercased
//! player names.

use std::collections::BTreeMap;

use tracing::debug;

use super::mvp::resolve_mvp;
use crate::models::{AggregatedPlayerStat, MatchGroup, MatchRow};

/// Fold admitted rows into per-player totals keyed by lowercased name.
pub fn fold_rows(rows: &[MatchRow]) -> BTreeMap<String, AggregatedPlayerStat> {
    let mut stats: BTreeMap<String, AggregatedPlayerStat> = BTreeMap::new();
    for row in rows {
        stats.entry(row.name_key()).or_default().fold(row);
    }
    stats
}

/// Apply one MVP credit per match to the aggregate map.
///
/// The credit is keyed by the winner's lowercase display name, not the
/// stable player id; a winner whose name is absent from the map loses the
/// credit silently. This mirrors the upstream exporter's behavior.
pub fn apply_mvp_credits(
    stats: &mut BTreeMap<String, AggregatedPlayerStat>,
    groups: &[MatchGroup],
) {
    for group in groups {
        let Some(mvp) = resolve_mvp(group) else {
            continue;
        };
        match stats.get_mut(&mvp.name_key()) {
            Some(stat) => stat.mvps += 1,
            None => debug!(
                "MVP credit dropped for match {}: no aggregate entry for '{}'",
                group.timestamp,
                mvp.name_key()
            ),
        }
    }
}
