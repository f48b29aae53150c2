//! File-backed store implementations.
//!
//! Ledgers, team records, name mappings, and the roster are whole-document
//! JSON files: read fully at open, held in memory, rewritten fully on every
//! put. Dedup keys are a plain append-only line file so marking a row never
//! rewrites history. Within one process the engine holds exclusive `&mut`
//! access to each store, which serializes all mutation.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{
    DedupStore, LedgerStore, MappingStore, RosterStore, StorageConfig, StorageError, TeamStore,
};
use crate::models::{CanonicalAccount, PlayerLedger, RosterAccount, TeamRecord};

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn read_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&contents)?)
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    debug!("Wrote document {:?}", path);
    Ok(())
}

/// Append-only dedup key file, one key per line.
pub struct FileDedupStore {
    path: PathBuf,
    keys: HashSet<String>,
}

impl FileDedupStore {
    /// Open the key file, loading every previously imported key. A missing
    /// file is an empty set; an unreadable file is fatal.
    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        let mut keys = HashSet::new();
        if path.exists() {
            let file = File::open(&path)?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                let key = line.trim();
                if !key.is_empty() {
                    keys.insert(key.to_string());
                }
            }
        }
        debug!("Loaded {} dedup keys from {:?}", keys.len(), path);
        Ok(Self { path, keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl DedupStore for FileDedupStore {
    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.keys.contains(key))
    }

    fn add(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.keys.insert(key.to_string()) {
            // Already marked; the file stays single-entry per key.
            return Ok(());
        }
        ensure_parent(&self.path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", key)?;
        writer.flush()?;
        Ok(())
    }
}

/// Whole-document JSON ledger store, keyed by account id.
pub struct JsonLedgerStore {
    path: PathBuf,
    ledgers: BTreeMap<String, PlayerLedger>,
}

impl JsonLedgerStore {
    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        let ledgers = read_document(&path)?;
        Ok(Self { path, ledgers })
    }
}

impl LedgerStore for JsonLedgerStore {
    fn get(&self, account_id: &str) -> Result<Option<PlayerLedger>, StorageError> {
        Ok(self.ledgers.get(account_id).cloned())
    }

    fn put(&mut self, ledger: &PlayerLedger) -> Result<(), StorageError> {
        // Commit to memory only once the document is on disk, so a failed
        // write cannot be flushed by a later unrelated put.
        let mut next = self.ledgers.clone();
        next.insert(ledger.account_id.clone(), ledger.clone());
        write_document(&self.path, &next)?;
        self.ledgers = next;
        Ok(())
    }

    fn all(&self) -> Result<Vec<PlayerLedger>, StorageError> {
        Ok(self.ledgers.values().cloned().collect())
    }
}

/// Whole-document JSON team record store, keyed by team name.
pub struct JsonTeamStore {
    path: PathBuf,
    records: BTreeMap<String, TeamRecord>,
}

impl JsonTeamStore {
    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        let records = read_document(&path)?;
        Ok(Self { path, records })
    }
}

impl TeamStore for JsonTeamStore {
    fn get(&self, team: &str) -> Result<Option<TeamRecord>, StorageError> {
        Ok(self.records.get(team).copied())
    }

    fn put(&mut self, team: &str, record: &TeamRecord) -> Result<(), StorageError> {
        let mut next = self.records.clone();
        next.insert(team.to_string(), *record);
        write_document(&self.path, &next)?;
        self.records = next;
        Ok(())
    }

    fn all(&self) -> Result<Vec<(String, TeamRecord)>, StorageError> {
        Ok(self
            .records
            .iter()
            .map(|(name, record)| (name.clone(), *record))
            .collect())
    }
}

/// Whole-document JSON name-mapping store. Names are stored lowercased.
pub struct JsonMappingStore {
    path: PathBuf,
    mappings: BTreeMap<String, String>,
}

impl JsonMappingStore {
    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        let mappings = read_document(&path)?;
        Ok(Self { path, mappings })
    }
}

impl MappingStore for JsonMappingStore {
    fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        Ok(self.mappings.get(&name.to_lowercase()).cloned())
    }

    fn add(&mut self, name: &str, account_id: &str) -> Result<(), StorageError> {
        let key = name.to_lowercase();
        if let Some(previous) = self.mappings.insert(key.clone(), account_id.to_string()) {
            if previous != account_id {
                warn!(
                    "Replacing mapping for '{}': {} -> {}",
                    key, previous, account_id
                );
            }
        }
        write_document(&self.path, &self.mappings)
    }

    fn remove(&mut self, name: &str) -> Result<bool, StorageError> {
        let removed = self.mappings.remove(&name.to_lowercase()).is_some();
        if removed {
            write_document(&self.path, &self.mappings)?;
        }
        Ok(removed)
    }

    fn all(&self) -> Result<Vec<(String, String)>, StorageError> {
        Ok(self
            .mappings
            .iter()
            .map(|(name, id)| (name.clone(), id.clone()))
            .collect())
    }
}

/// Whole-document JSON roster store. Entries keep insertion order so name
/// lookups return the first match deterministically.
pub struct JsonRosterStore {
    path: PathBuf,
    accounts: Vec<RosterAccount>,
}

impl JsonRosterStore {
    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        let accounts = read_document(&path)?;
        Ok(Self { path, accounts })
    }
}

impl RosterStore for JsonRosterStore {
    fn resolve(&self, account_id: &str) -> Result<Option<CanonicalAccount>, StorageError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.account_id == account_id)
            .map(RosterAccount::canonical))
    }

    fn find_by_name(&self, name: &str) -> Result<Option<CanonicalAccount>, StorageError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.matches_name(name))
            .map(RosterAccount::canonical))
    }

    fn add(&mut self, account: &RosterAccount) -> Result<(), StorageError> {
        if let Some(existing) = self
            .accounts
            .iter_mut()
            .find(|a| a.account_id == account.account_id)
        {
            *existing = account.clone();
        } else {
            self.accounts.push(account.clone());
        }
        write_document(&self.path, &self.accounts)
    }

    fn all(&self) -> Result<Vec<RosterAccount>, StorageError> {
        Ok(self.accounts.clone())
    }
}

/// All stores opened from one storage config.
pub struct FileStores {
    pub dedup: FileDedupStore,
    pub ledgers: JsonLedgerStore,
    pub teams: JsonTeamStore,
    pub mappings: JsonMappingStore,
    pub roster: JsonRosterStore,
}

impl FileStores {
    /// Open every store. Any unreadable file is fatal before processing
    /// starts.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        Ok(Self {
            dedup: FileDedupStore::open(config.dedup_path())?,
            ledgers: JsonLedgerStore::open(config.ledgers_path())?,
            teams: JsonTeamStore::open(config.teams_path())?,
            mappings: JsonMappingStore::open(config.mappings_path())?,
            roster: JsonRosterStore::open(config.roster_path())?,
        })
    }
}
