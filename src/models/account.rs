//! Canonical account and roster models.

use serde::{Deserialize, Serialize};

/// The resolved internal identity an external player name maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalAccount {
    pub account_id: String,
    pub display_name: String,
}

/// One curated roster entry the identity resolver matches against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterAccount {
    pub account_id: String,

    /// Display name shown to operators
    pub display_name: String,

    /// Login/account name, matched as a fallback to the display name
    pub username: String,
}

impl RosterAccount {
    /// Exact case-insensitive match against either name field.
    pub fn matches_name(&self, name: &str) -> bool {
        self.display_name.eq_ignore_ascii_case(name) || self.username.eq_ignore_ascii_case(name)
    }

    pub fn canonical(&self) -> CanonicalAccount {
        CanonicalAccount {
            account_id: self.account_id.clone(),
            display_name: self.display_name.clone(),
        }
    }
}
