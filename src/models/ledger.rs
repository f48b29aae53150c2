//! Durable ledger and team-record models.

use serde::{Deserialize, Serialize};

use super::AggregatedPlayerStat;

/// Durable cumulative totals for one canonical account.
///
/// Monotonically increasing under the import engine; corrective removal is
/// an external admin operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerLedger {
    pub account_id: String,
    pub display_name: String,

    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub saves: u32,
    pub shots: u32,
    pub demos: u32,
    pub mvps: u32,
}

impl PlayerLedger {
    pub fn new(account_id: String, display_name: String) -> Self {
        Self {
            account_id,
            display_name,
            ..Default::default()
        }
    }

    /// Merge one run's aggregated delta into the cumulative totals.
    /// The merged fields are fixed and enumerated here; there is no dynamic
    /// field copying.
    pub fn apply(&mut self, delta: &AggregatedPlayerStat) {
        self.games_played += delta.games;
        self.goals += delta.goals;
        self.assists += delta.assists;
        self.saves += delta.saves;
        self.shots += delta.shots;
        self.demos += delta.demos;
        self.mvps += delta.mvps;
    }
}

/// Durable per-team win/loss totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
}

impl TeamRecord {
    /// Apply a signed corrective delta, clamping both counters at zero.
    /// The import engine itself only ever adds; this is the admin surface.
    pub fn adjust(&mut self, wins_delta: i64, losses_delta: i64) {
        self.wins = apply_delta(self.wins, wins_delta);
        self.losses = apply_delta(self.losses, losses_delta);
    }
}

fn apply_delta(current: u32, delta: i64) -> u32 {
    let next = i64::from(current) + delta;
    next.clamp(0, i64::from(u32::MAX)) as u32
}
