//! # Scrim Ledger
//!
//! Ingests per-player, per-match stat rows exported from the game client and
//! reconciles them into durable per-player career totals and per-team
//! win/loss records. Re-submitting the same export never double-counts a
//! match.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (rows, aggregates, accounts, ledgers,
//!   team records, run summaries)
//! - **engine**: Parsing, validation, dedup, grouping, MVP, aggregation,
//!   identity resolution, team reconciliation, and the import coordinator
//! - **storage**: Store traits plus the default file-backed implementations
//! - **config**: Configuration loading and validation

pub mod config;
pub mod engine;
pub mod models;
pub mod storage;

pub use models::*;
