//! Core data models for the match importer.

mod account;
mod aggregate;
mod ledger;
mod row;
mod summary;

pub use account::*;
pub use aggregate::*;
pub use ledger::*;
pub use row::*;
pub use summary::*;
