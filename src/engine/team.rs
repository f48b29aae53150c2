//! Team win/loss reconciliation.
//!
//! A match typically contributes one row per participant, but a team's
//! record moves by exactly one per real match. The reconciler keeps a
//! per-run credited set keyed by `(timestamp, team, result)` and
//! check-and-sets it before every additive team-record update.

use std::collections::HashSet;

use tracing::debug;

use crate::config::TeamAssignment;
use crate::models::{MatchResult, MatchRow};
use crate::storage::{StorageError, TeamStore};

/// Per-run exactly-once team crediting.
pub struct TeamReconciler {
    assignment: TeamAssignment,
    credited: HashSet<(String, String, MatchResult)>,
}

impl TeamReconciler {
    pub fn new(assignment: TeamAssignment) -> Self {
        Self {
            assignment,
            credited: HashSet::new(),
        }
    }

    /// Credit the team assigned to this row's color, once per
    /// `(match, team, result)`. Returns whether a credit was applied.
    pub fn credit(
        &mut self,
        row: &MatchRow,
        teams: &mut dyn TeamStore,
    ) -> Result<bool, StorageError> {
        let team = self.assignment.team_for(row.team_color).to_string();
        let key = (row.timestamp.clone(), team.clone(), row.result);

        if !self.credited.insert(key) {
            return Ok(false);
        }

        let mut record = teams.get(&team)?.unwrap_or_default();
        match row.result {
            MatchResult::Win => record.wins += 1,
            MatchResult::Loss => record.losses += 1,
        }
        teams.put(&team, &record)?;
        debug!(
            "Credited {} with a {} for match {}",
            team, row.result, row.timestamp
        );
        Ok(true)
    }

    /// Matches credited so far in this run.
    pub fn credits_applied(&self) -> usize {
        self.credited.len()
    }
}
