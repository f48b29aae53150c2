//! Durable storage for the import engine.
//!
//! The engine only ever talks to the trait surface defined here:
//! - `DedupStore`: append-only idempotency key set (`contains`/`add`)
//! - `LedgerStore`: per-account cumulative totals (`get`/`put`)
//! - `TeamStore`: per-team win/loss records (`get`/`put`)
//! - `MappingStore`: admin-curated external-name -> account mappings
//! - `RosterStore`: known accounts for identity resolution
//!
//! The default backend in `json` keeps whole-document JSON files plus a
//! line-per-key dedup file; a transactional backend can be swapped in
//! without touching engine logic.

mod json;

pub use json::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{CanonicalAccount, PlayerLedger, RosterAccount, TeamRecord};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Append-only dedup key file, one key per line.
    pub fn dedup_path(&self) -> PathBuf {
        self.data_dir.join("imported_keys.log")
    }

    pub fn ledgers_path(&self) -> PathBuf {
        self.data_dir.join("ledgers.json")
    }

    pub fn teams_path(&self) -> PathBuf {
        self.data_dir.join("team_records.json")
    }

    pub fn mappings_path(&self) -> PathBuf {
        self.data_dir.join("name_mappings.json")
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join("roster.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Durable set of row idempotency keys. Append-only; keys are never pruned.
pub trait DedupStore {
    fn contains(&self, key: &str) -> Result<bool, StorageError>;
    fn add(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Durable per-account cumulative totals.
pub trait LedgerStore {
    fn get(&self, account_id: &str) -> Result<Option<PlayerLedger>, StorageError>;
    fn put(&mut self, ledger: &PlayerLedger) -> Result<(), StorageError>;
    fn all(&self) -> Result<Vec<PlayerLedger>, StorageError>;
}

/// Durable per-team win/loss records.
pub trait TeamStore {
    fn get(&self, team: &str) -> Result<Option<TeamRecord>, StorageError>;
    fn put(&mut self, team: &str, record: &TeamRecord) -> Result<(), StorageError>;
    fn all(&self) -> Result<Vec<(String, TeamRecord)>, StorageError>;
}

/// Admin-curated explicit mappings from lowercased external names to
/// account ids. One-to-one.
pub trait MappingStore {
    /// Look up by lowercased external name.
    fn get(&self, name: &str) -> Result<Option<String>, StorageError>;
    fn add(&mut self, name: &str, account_id: &str) -> Result<(), StorageError>;
    /// Returns whether a mapping was present.
    fn remove(&mut self, name: &str) -> Result<bool, StorageError>;
    fn all(&self) -> Result<Vec<(String, String)>, StorageError>;
}

/// Roster of known accounts. Lookup order is roster insertion order, so
/// name matching stays deterministic.
pub trait RosterStore {
    fn resolve(&self, account_id: &str) -> Result<Option<CanonicalAccount>, StorageError>;
    /// First roster entry whose display name or username matches the given
    /// name exactly, case-insensitively.
    fn find_by_name(&self, name: &str) -> Result<Option<CanonicalAccount>, StorageError>;
    fn add(&mut self, account: &RosterAccount) -> Result<(), StorageError>;
    fn all(&self) -> Result<Vec<RosterAccount>, StorageError>;
}
