//! Match import and reconciliation engine.
//!
//! - **parser**: positional export parsing and batch validation
//! - **group**: partition of admitted rows into matches
//! - **mvp**: winning-side MVP selection
//! - **aggregate**: per-run player totals
//! - **identity**: external-name -> canonical-account resolution
//! - **team**: exactly-once per-match team crediting
//! - **import**: the run coordinator tying the stages together

pub mod aggregate;
pub mod group;
pub mod identity;
pub mod import;
pub mod mvp;
pub mod parser;
pub mod team;

pub use import::{ImportCoordinator, ImportError, ImportOptions, Stores};
