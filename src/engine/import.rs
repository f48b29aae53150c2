//! Import run orchestration.
//!
//! One run moves through: Parsing -> Validating (abort on errors) ->
//! Deduplicating -> Grouping+MVP -> Aggregating -> Resolving Identities ->
//! Persisting -> Summarizing. Malformed input aborts the whole batch before
//! anything is written; once persisting starts, per-player and per-team
//! failures are collected into the summary and the run continues.

use std::io::Read;

use thiserror::Error;
use tracing::{info, warn};

use super::aggregate::{apply_mvp_credits, fold_rows};
use super::group::group_by_match;
use super::identity::resolve_identity;
use super::parser::{parse_export, validate};
use super::team::TeamReconciler;
use crate::config::TeamAssignment;
use crate::models::{ImportSummary, MatchedPlayer, PlayerLedger, UnmatchedPlayer};
use crate::storage::{
    DedupStore, FileStores, LedgerStore, MappingStore, RosterStore, StorageError, TeamStore,
};

/// Errors that abort an import run outright.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The batch failed validation; nothing was persisted.
    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<String>),

    #[error("failed to read export: {0}")]
    Parse(#[from] csv::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Options for one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Compute the full summary without marking dedup keys or persisting
    /// any ledger or team record.
    pub dry_run: bool,
}

/// The storage dependencies one run mutates. Exclusive references serialize
/// all mutation within the process; there are no ambient storage handles.
pub struct Stores<'a> {
    pub dedup: &'a mut dyn DedupStore,
    pub ledgers: &'a mut dyn LedgerStore,
    pub teams: &'a mut dyn TeamStore,
    pub mappings: &'a dyn MappingStore,
    pub roster: &'a dyn RosterStore,
}

impl<'a> Stores<'a> {
    /// Borrow every store from an opened file-store set.
    pub fn from_files(files: &'a mut FileStores) -> Self {
        Self {
            dedup: &mut files.dedup,
            ledgers: &mut files.ledgers,
            teams: &mut files.teams,
            mappings: &files.mappings,
            roster: &files.roster,
        }
    }
}

/// Orchestrates one import run end to end.
pub struct ImportCoordinator<'a> {
    stores: Stores<'a>,
    assignment: TeamAssignment,
}

impl<'a> ImportCoordinator<'a> {
    pub fn new(stores: Stores<'a>, assignment: TeamAssignment) -> Self {
        Self { stores, assignment }
    }

    /// Run one import over a raw export byte stream.
    pub fn import<R: Read>(
        &mut self,
        input: R,
        options: &ImportOptions,
    ) -> Result<ImportSummary, ImportError> {
        // Parsing
        let raw_rows = parse_export(input)?;
        info!("Parsed {} rows from export", raw_rows.len());

        // Validating: any malformed row aborts the batch before any
        // persistence, including dedup marks.
        let (valid_rows, validation_errors) = validate(&raw_rows);
        if !validation_errors.is_empty() {
            warn!(
                "Aborting import: {} validation error(s)",
                validation_errors.len()
            );
            return Err(ImportError::Validation(validation_errors));
        }

        // Deduplicating: admitted rows are marked at admission, before any
        // stats are folded, so a re-submitted export can never double-count.
        let mut admitted = Vec::with_capacity(valid_rows.len());
        let mut duplicates_skipped = 0usize;
        for row in valid_rows {
            let key = row.dedup_key();
            if self.stores.dedup.contains(&key)? {
                duplicates_skipped += 1;
                continue;
            }
            if !options.dry_run {
                self.stores.dedup.add(&key)?;
            }
            admitted.push(row);
        }
        info!(
            "Admitted {} rows, skipped {} duplicates",
            admitted.len(),
            duplicates_skipped
        );

        // Grouping + MVP, then aggregation over only this run's rows.
        let groups = group_by_match(&admitted);
        let mut stats = fold_rows(&admitted);
        apply_mvp_credits(&mut stats, &groups);

        // Resolving identities.
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();
        for (name, totals) in stats {
            match resolve_identity(&name, self.stores.mappings, self.stores.roster)? {
                Some(account) => matched.push(MatchedPlayer {
                    name,
                    account,
                    totals,
                }),
                None => unmatched.push(UnmatchedPlayer { name, totals }),
            }
        }

        let mut errors = Vec::new();

        if options.dry_run {
            info!("Dry run: skipping persistence");
        } else {
            // Persisting: failures here are local. One bad ledger write or
            // team write is logged into the summary and the run continues;
            // nothing already written is rolled back.
            for player in &matched {
                let result = self.stores.ledgers.get(&player.account.account_id).and_then(
                    |existing| {
                        let mut ledger = existing.unwrap_or_else(|| {
                            PlayerLedger::new(
                                player.account.account_id.clone(),
                                player.account.display_name.clone(),
                            )
                        });
                        ledger.apply(&player.totals);
                        self.stores.ledgers.put(&ledger)
                    },
                );

                if let Err(e) = result {
                    let message = format!(
                        "failed to persist ledger for {}: {}",
                        player.account.account_id, e
                    );
                    warn!("{}", message);
                    errors.push(message);
                }
            }

            let mut reconciler = TeamReconciler::new(self.assignment.clone());
            for row in &admitted {
                if let Err(e) = reconciler.credit(row, self.stores.teams) {
                    let message = format!(
                        "failed to credit team record for match {}: {}",
                        row.timestamp, e
                    );
                    warn!("{}", message);
                    errors.push(message);
                }
            }
        }

        info!(
            "Import complete: {} matched, {} unmatched, {} error(s)",
            matched.len(),
            unmatched.len(),
            errors.len()
        );

        Ok(ImportSummary {
            rows_parsed: raw_rows.len(),
            rows_admitted: admitted.len(),
            duplicates_skipped,
            matches_seen: groups.len(),
            matched,
            unmatched,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RosterAccount, TeamRecord};
    use crate::storage::StorageConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const EXPORT: &str = "\
Team Color,Player,Goals,Assists,Saves,Shots,Demos,Score,Result,Timestamp,Id
Orange,Calyx,2,1,0,5,1,390,Win,t1,7601
Blue,Vex,1,0,3,2,0,200,Loss,t1,7602
Orange,Calyx,1,0,2,3,0,250,Win,t2,7601
Blue,Vex,0,1,4,1,1,310,Loss,t2,7602
";

    fn assignment() -> TeamAssignment {
        TeamAssignment::new("Team1".to_string(), "Team2".to_string())
    }

    fn open_stores(dir: &TempDir) -> FileStores {
        let config = StorageConfig::new(dir.path().to_path_buf());
        let mut files = FileStores::open(&config).unwrap();
        files
            .roster
            .add(&RosterAccount {
                account_id: "a-1".to_string(),
                display_name: "Calyx".to_string(),
                username: "calyx".to_string(),
            })
            .unwrap();
        drop(files);
        FileStores::open(&config).unwrap()
    }

    fn run_import(files: &mut FileStores, data: &str) -> Result<ImportSummary, ImportError> {
        let mut coordinator =
            ImportCoordinator::new(Stores::from_files(files), assignment());
        coordinator.import(data.as_bytes(), &ImportOptions::default())
    }

    #[test]
    fn test_full_import_run() {
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);

        let summary = run_import(&mut files, EXPORT).unwrap();

        assert_eq!(summary.rows_parsed, 4);
        assert_eq!(summary.rows_admitted, 4);
        assert_eq!(summary.duplicates_skipped, 0);
        assert_eq!(summary.matches_seen, 2);
        assert_eq!(summary.distinct_players(), 2);
        assert!(summary.errors.is_empty());

        // Calyx is on the roster; Vex is not.
        assert_eq!(summary.matched.len(), 1);
        assert_eq!(summary.matched[0].account.account_id, "a-1");
        assert_eq!(summary.matched[0].totals.mvps, 2);
        assert_eq!(summary.unmatched.len(), 1);
        assert_eq!(summary.unmatched[0].name, "vex");

        let ledger = files.ledgers.get("a-1").unwrap().unwrap();
        assert_eq!(ledger.games_played, 2);
        assert_eq!(ledger.goals, 3);
        assert_eq!(ledger.mvps, 2);

        // One win per match for Team1, one loss per match for Team2.
        assert_eq!(
            files.teams.get("Team1").unwrap().unwrap(),
            TeamRecord { wins: 2, losses: 0 }
        );
        assert_eq!(
            files.teams.get("Team2").unwrap().unwrap(),
            TeamRecord { wins: 0, losses: 2 }
        );
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);

        run_import(&mut files, EXPORT).unwrap();
        let ledger_before = files.ledgers.get("a-1").unwrap().unwrap();
        let team_before = files.teams.get("Team1").unwrap().unwrap();

        let second = run_import(&mut files, EXPORT).unwrap();

        assert_eq!(second.duplicates_skipped, 4);
        assert_eq!(second.rows_admitted, 0);
        assert_eq!(second.matches_seen, 0);
        assert_eq!(second.distinct_players(), 0);

        let ledger_after = files.ledgers.get("a-1").unwrap().unwrap();
        assert_eq!(ledger_after.games_played, ledger_before.games_played);
        assert_eq!(ledger_after.goals, ledger_before.goals);
        assert_eq!(ledger_after.mvps, ledger_before.mvps);
        assert_eq!(files.teams.get("Team1").unwrap().unwrap(), team_before);
    }

    #[test]
    fn test_validation_abort_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);

        let bad = "\
Orange,Calyx,2,1,0,5,1,390,Win,t1,7601
Blue,Vex,-1,0,3,2,0,200,Loss,t1,7602
";
        let err = run_import(&mut files, bad).unwrap_err();
        match err {
            ImportError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("negative goals"));
            }
            other => panic!("expected validation abort, got {:?}", other),
        }

        // Nothing from the batch landed anywhere, including the good row.
        assert!(files.ledgers.all().unwrap().is_empty());
        assert!(files.teams.all().unwrap().is_empty());
        assert!(!files.dedup.contains("t1_7601").unwrap());
    }

    #[test]
    fn test_unmatched_player_not_persisted() {
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);

        let summary = run_import(&mut files, EXPORT).unwrap();

        let unmatched = &summary.unmatched[0];
        assert_eq!(unmatched.name, "vex");
        assert_eq!(unmatched.totals.games, 2);
        assert_eq!(unmatched.totals.saves, 7);

        // Vex's totals appear only in the summary, never in a ledger.
        for ledger in files.ledgers.all().unwrap() {
            assert_ne!(ledger.display_name.to_lowercase(), "vex");
        }
    }

    #[test]
    fn test_dry_run_mutates_nothing() {
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);

        let mut coordinator =
            ImportCoordinator::new(Stores::from_files(&mut files), assignment());
        let summary = coordinator
            .import(EXPORT.as_bytes(), &ImportOptions { dry_run: true })
            .unwrap();

        assert_eq!(summary.rows_admitted, 4);
        assert_eq!(summary.matched.len(), 1);

        assert!(files.ledgers.all().unwrap().is_empty());
        assert!(files.teams.all().unwrap().is_empty());
        assert!(!files.dedup.contains("t1_7601").unwrap());

        // A real import afterwards still sees everything as new.
        let summary = run_import(&mut files, EXPORT).unwrap();
        assert_eq!(summary.duplicates_skipped, 0);
    }

    #[test]
    fn test_partial_overlap_only_new_rows_count() {
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);

        let first = "\
Orange,Calyx,2,1,0,5,1,390,Win,t1,7601
";
        run_import(&mut files, first).unwrap();

        // Second export repeats t1 and adds t2.
        let summary = run_import(&mut files, EXPORT).unwrap();
        assert_eq!(summary.duplicates_skipped, 1);
        assert_eq!(summary.rows_admitted, 3);

        let ledger = files.ledgers.get("a-1").unwrap().unwrap();
        assert_eq!(ledger.games_played, 2);
        assert_eq!(ledger.goals, 3);
    }

    /// In-memory ledger store that refuses writes for one account.
    struct FailingLedgerStore {
        ledgers: std::collections::BTreeMap<String, PlayerLedger>,
        fail_for: String,
    }

    impl FailingLedgerStore {
        fn new(fail_for: &str) -> Self {
            Self {
                ledgers: Default::default(),
                fail_for: fail_for.to_string(),
            }
        }
    }

    impl LedgerStore for FailingLedgerStore {
        fn get(&self, account_id: &str) -> Result<Option<PlayerLedger>, StorageError> {
            Ok(self.ledgers.get(account_id).cloned())
        }

        fn put(&mut self, ledger: &PlayerLedger) -> Result<(), StorageError> {
            if ledger.account_id == self.fail_for {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.ledgers
                .insert(ledger.account_id.clone(), ledger.clone());
            Ok(())
        }

        fn all(&self) -> Result<Vec<PlayerLedger>, StorageError> {
            Ok(self.ledgers.values().cloned().collect())
        }
    }

    #[test]
    fn test_ledger_write_failure_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);
        files
            .roster
            .add(&RosterAccount {
                account_id: "a-2".to_string(),
                display_name: "Vex".to_string(),
                username: "vex".to_string(),
            })
            .unwrap();

        let mut ledgers = FailingLedgerStore::new("a-1");
        let stores = Stores {
            dedup: &mut files.dedup,
            ledgers: &mut ledgers,
            teams: &mut files.teams,
            mappings: &files.mappings,
            roster: &files.roster,
        };
        let mut coordinator = ImportCoordinator::new(stores, assignment());
        let summary = coordinator
            .import(EXPORT.as_bytes(), &ImportOptions::default())
            .unwrap();

        // One ledger write failed; the run still finishes, reports the
        // failure, and persists everything else.
        assert_eq!(summary.matched.len(), 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("a-1"));

        assert!(ledgers.get("a-1").unwrap().is_none());
        let vex = ledgers.get("a-2").unwrap().unwrap();
        assert_eq!(vex.games_played, 2);

        // Team crediting is unaffected by the ledger failure.
        assert_eq!(
            files.teams.get("Team1").unwrap().unwrap(),
            TeamRecord { wins: 2, losses: 0 }
        );
    }

    #[test]
    fn test_scenario_one_match_two_sides() {
        // One match, one row per side: the Orange side's team gains exactly
        // one win, the sole winner takes the MVP, and the loser's team gains
        // exactly one loss.
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);

        let data = "\
Orange,Calyx,2,0,0,3,0,390,Win,t1,7601
Blue,Vex,1,0,2,2,0,200,Loss,t1,7602
";
        let summary = run_import(&mut files, data).unwrap();

        assert_eq!(summary.matches_seen, 1);
        assert_eq!(summary.matched[0].totals.mvps, 1);
        assert_eq!(
            files.teams.get("Team1").unwrap().unwrap(),
            TeamRecord { wins: 1, losses: 0 }
        );
        assert_eq!(
            files.teams.get("Team2").unwrap().unwrap(),
            TeamRecord { wins: 0, losses: 1 }
        );
    }

    #[test]
    fn test_scenario_single_sided_loss_export() {
        // Only the losing side was exported: no MVP, one loss credit.
        let dir = TempDir::new().unwrap();
        let mut files = open_stores(&dir);

        let data = "\
Blue,Vex,0,0,3,1,0,180,Loss,t9,7602
Blue,Drifter,1,0,1,2,0,220,Loss,t9,7603
";
        let summary = run_import(&mut files, data).unwrap();

        assert_eq!(summary.matches_seen, 1);
        for player in &summary.unmatched {
            assert_eq!(player.totals.mvps, 0);
        }
        assert_eq!(
            files.teams.get("Team2").unwrap().unwrap(),
            TeamRecord { wins: 0, losses: 1 }
        );
        assert!(files.teams.get("Team1").unwrap().is_none());
    }
}
