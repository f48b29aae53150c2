//! Per-player, per-match row model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Team color as exported by the game client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamColor {
    Orange,
    Blue,
}

impl TeamColor {
    /// Parse a color field case-insensitively. Returns `None` for anything
    /// that is not a recognized color.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("orange") {
            Some(TeamColor::Orange)
        } else if s.eq_ignore_ascii_case("blue") {
            Some(TeamColor::Blue)
        } else {
            None
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamColor::Orange => write!(f, "Orange"),
            TeamColor::Blue => write!(f, "Blue"),
        }
    }
}

/// Outcome of one match for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    Win,
    Loss,
}

impl MatchResult {
    /// Parse a result field case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("win") {
            Some(MatchResult::Win)
        } else if s.eq_ignore_ascii_case("loss") {
            Some(MatchResult::Loss)
        } else {
            None
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Win => write!(f, "Win"),
            MatchResult::Loss => write!(f, "Loss"),
        }
    }
}

/// One player's validated record in one match.
///
/// The timestamp is an opaque token: rows with equal tokens belong to the
/// same match, and `(timestamp, player_id)` is the idempotency key. It is
/// never parsed as calendar time for grouping or dedup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRow {
    /// Player name as exported by the game client
    pub player_name: String,

    /// Stable per-account identifier from the game client
    pub player_id: String,

    /// Side the player was on
    pub team_color: TeamColor,

    pub goals: u32,
    pub assists: u32,
    pub saves: u32,
    pub shots: u32,
    pub demos: u32,

    /// In-game score, used only for MVP tie-breaking
    pub score: i64,

    pub result: MatchResult,

    /// Opaque match timestamp token shared by all rows of one match
    pub timestamp: String,
}

impl MatchRow {
    /// Durable idempotency key for this row.
    pub fn dedup_key(&self) -> String {
        format!("{}_{}", self.timestamp, self.player_id)
    }

    /// Lowercased player name, the aggregation key.
    pub fn name_key(&self) -> String {
        self.player_name.to_lowercase()
    }
}
