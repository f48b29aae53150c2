//! MVP resolution.

use crate::models::{MatchGroup, MatchResult, MatchRow};

/// Pick the MVP of one match: the winning-side row with the highest score.
/// Ties keep the first maximal row encountered; there is no secondary key.
/// Returns `None` when the group carries no winning rows, which happens when
/// only the losing side was exported.
pub fn resolve_mvp(group: &MatchGroup) -> Option<&MatchRow> {
    let mut best: Option<&MatchRow> = None;
    for row in &group.rows {
        if row.result != MatchResult::Win {
            continue;
        }
        match best {
            Some(current) if row.score <= current.score => {}
            _ => best = Some(row),
        }
    }
    best
}
