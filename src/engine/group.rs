//! Match grouping.
//!
//! Pure partition of admitted rows by timestamp token. Two rows belong to
//! the same match if and only if their tokens are equal as opaque strings;
//! there is no tolerance window and no clock normalization.

use std::collections::HashMap;

use crate::models::{MatchGroup, MatchRow};

/// Partition admitted rows into match groups, preserving first-encounter
/// order of both groups and rows within a group.
pub fn group_by_match(rows: &[MatchRow]) -> Vec<MatchGroup> {
    let mut groups: Vec<MatchGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.timestamp) {
            Some(&i) => groups[i].rows.push(row.clone()),
            None => {
                index.insert(row.timestamp.clone(), groups.len());
                groups.push(MatchGroup {
                    timestamp: row.timestamp.clone(),
                    rows: vec![row.clone()],
                });
            }
        }
    }

    groups
}
