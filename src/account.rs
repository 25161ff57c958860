//! Tenant scoping for broker requests.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{AlksError, Result};

/// Cached regex for the composite account key.
///
/// Format: `{account-number}/ALKS{role-name} - {alias}`, where the alias
/// segment is optional.
static ACCOUNT_KEY_REGEX: OnceLock<Regex> = OnceLock::new();

fn account_key_regex() -> &'static Regex {
    ACCOUNT_KEY_REGEX.get_or_init(|| {
        Regex::new(r"^(?P<id>[^/\s]+)/ALKS(?P<role>[^\s]+?)(?: - (?P<alias>.*))?$")
            .expect("Invalid ACCOUNT_KEY_REGEX pattern")
    })
}

/// The account/role pair that scopes every request of a client.
///
/// Serialized as `{"account": ..., "role": ...}` and embedded into request
/// bodies that need tenant scoping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountContext {
    account: String,
    role: String,
}

impl AccountContext {
    /// Creates a context. Both fields must be non-empty.
    pub fn new(account: impl Into<String>, role: impl Into<String>) -> Result<Self> {
        let account = account.into();
        let role = role.into();
        if account.trim().is_empty() {
            return Err(AlksError::Construction("account is required".into()));
        }
        if role.trim().is_empty() {
            return Err(AlksError::Construction("role is required".into()));
        }
        Ok(Self { account, role })
    }

    /// Builds the composite account key `{id}/ALKS{role} - {alias}`.
    pub fn compose(account_id: &str, role: &str, alias: &str) -> String {
        format!("{}/ALKS{} - {}", account_id, role, alias)
    }

    /// The composite account key.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The bare role name, e.g. `Admin`.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// The account number at the front of the composite key.
    ///
    /// Falls back to the whole key when it is not in composite form.
    pub fn account_id(&self) -> &str {
        account_key_regex()
            .captures(&self.account)
            .and_then(|caps| caps.name("id"))
            .map(|m| m.as_str())
            .unwrap_or(&self.account)
    }

    /// The account alias following ` - `, if present.
    pub fn alias(&self) -> Option<&str> {
        account_key_regex()
            .captures(&self.account)
            .and_then(|caps| caps.name("alias"))
            .map(|m| m.as_str())
    }
}
