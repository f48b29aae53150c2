//! Import run summary.
//!
//! Ephemeral result of one import invocation. Reported to the caller and
//! then discarded; never persisted.

use serde::{Deserialize, Serialize};

use super::{AggregatedPlayerStat, CanonicalAccount};

/// How many error strings are rendered before truncating.
pub const MAX_RENDERED_ERRORS: usize = 10;

/// A player whose external name resolved to a canonical account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPlayer {
    /// External name key (lowercased)
    pub name: String,
    pub account: CanonicalAccount,
    pub totals: AggregatedPlayerStat,
}

/// A player with no mapping and no roster match. Totals are retained for
/// operator review but never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmatchedPlayer {
    /// External name key (lowercased)
    pub name: String,
    pub totals: AggregatedPlayerStat,
}

/// Result of one import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Rows that survived raw parsing
    pub rows_parsed: usize,

    /// Rows admitted past the dedup gate
    pub rows_admitted: usize,

    /// Rows excluded as already-imported duplicates
    pub duplicates_skipped: usize,

    /// Distinct matches among the admitted rows
    pub matches_seen: usize,

    pub matched: Vec<MatchedPlayer>,
    pub unmatched: Vec<UnmatchedPlayer>,

    /// Non-fatal errors accumulated during persistence
    pub errors: Vec<String>,
}

impl ImportSummary {
    /// Distinct players seen across admitted rows.
    pub fn distinct_players(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    /// Error list bounded for rendering: the first `MAX_RENDERED_ERRORS`
    /// messages plus a remainder note.
    pub fn rendered_errors(&self) -> Vec<String> {
        render_bounded(&self.errors)
    }
}

/// Bound a message list to the first `MAX_RENDERED_ERRORS` entries, noting
/// how many were elided.
pub fn render_bounded(messages: &[String]) -> Vec<String> {
    let mut out: Vec<String> = messages.iter().take(MAX_RENDERED_ERRORS).cloned().collect();
    if messages.len() > MAX_RENDERED_ERRORS {
        out.push(format!(
            "(and {} more)",
            messages.len() - MAX_RENDERED_ERRORS
        ));
    }
    out
}
