//! Player identity resolution.
//!
//! Maps an external player name to a canonical account: explicit mapping
//! first, then exact case-insensitive roster match, else unmatched. A name
//! is never guessed into an account; ambiguity degrades to the first
//! deterministic roster match or to unmatched.

use tracing::{debug, warn};

use crate::models::CanonicalAccount;
use crate::storage::{MappingStore, RosterStore, StorageError};

/// Resolve one external name. Returns `None` when the player is unmatched.
pub fn resolve_identity(
    name: &str,
    mappings: &dyn MappingStore,
    roster: &dyn RosterStore,
) -> Result<Option<CanonicalAccount>, StorageError> {
    let key = name.to_lowercase();

    if let Some(account_id) = mappings.get(&key)? {
        match roster.resolve(&account_id)? {
            Some(account) => {
                debug!("Resolved '{}' via explicit mapping -> {}", key, account_id);
                return Ok(Some(account));
            }
            None => {
                // A stale mapping falls through to the roster scan rather
                // than failing the player outright.
                warn!(
                    "Mapping for '{}' points at unknown account {}; trying roster",
                    key, account_id
                );
            }
        }
    }

    if let Some(account) = roster.find_by_name(name)? {
        debug!(
            "Resolved '{}' via roster name match -> {}",
            key, account.account_id
        );
        return Ok(Some(account));
    }

    debug!("No identity for '{}'", key);
    Ok(None)
}
