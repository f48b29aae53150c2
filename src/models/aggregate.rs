//! Per-run aggregation models.
//!
//! `AggregatedPlayerStat` lives only for the duration of one import run; it
//! accumulates the newly admitted rows for one player and is merged into the
//! durable ledger at persist time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{MatchResult, MatchRow};

/// Per-player totals accumulated over one import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedPlayerStat {
    /// Stable per-account identifier from the game client
    pub player_id: String,

    pub games: u32,
    pub goals: u32,
    pub assists: u32,
    pub saves: u32,
    pub shots: u32,
    pub demos: u32,
    pub wins: u32,
    pub losses: u32,
    pub mvps: u32,

    /// Latest timestamp token seen, by the token's natural string ordering
    pub last_seen: String,
}

impl AggregatedPlayerStat {
    /// Fold one admitted row into the running totals.
    pub fn fold(&mut self, row: &MatchRow) {
        self.player_id = row.player_id.clone();
        self.games += 1;
        self.goals += row.goals;
        self.assists += row.assists;
        self.saves += row.saves;
        self.shots += row.shots;
        self.demos += row.demos;
        match row.result {
            MatchResult::Win => self.wins += 1,
            MatchResult::Loss => self.losses += 1,
        }
        if row.timestamp > self.last_seen {
            self.last_seen = row.timestamp.clone();
        }
    }

    /// Best-effort chronological reading of `last_seen`, for display only.
    /// Grouping and dedup never depend on this parsing.
    pub fn last_seen_datetime(&self) -> Option<NaiveDateTime> {
        const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M"];
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&self.last_seen, fmt).ok())
    }
}

/// All admitted rows sharing one match timestamp token.
#[derive(Debug, Clone)]
pub struct MatchGroup {
    /// The shared timestamp token identifying the match
    pub timestamp: String,

    /// Participant rows, in admission order
    pub rows: Vec<MatchRow>,
}
