//! Account and roster types.
//!
//! An Account is one managed posting identity. Its credential bundle is an
//! opaque JSON value owned by the publisher implementation; the scheduler
//! never inspects it. The roster is loaded once at startup and stays
//! immutable for the run.

use crate::error::{FlockrError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One managed posting identity in the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, unique within the roster
    pub username: String,

    /// Opaque credential bundle passed through to the publisher
    #[serde(default)]
    pub credentials: serde_json::Value,
}

impl Account {
    /// Create an account with empty credentials (tests and dry runs).
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            credentials: serde_json::Value::Null,
        }
    }
}

/// The immutable account set for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub accounts: Vec<Account>,
}

impl Roster {
    /// Load a roster from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let roster: Roster = serde_json::from_str(&content)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Validate roster invariants: non-empty, unique usernames, credentials present.
    pub fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            return Err(FlockrError::InvalidAccount("roster is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for account in &self.accounts {
            if account.username.trim().is_empty() {
                return Err(FlockrError::InvalidAccount("blank username".to_string()));
            }
            if !seen.insert(account.username.as_str()) {
                return Err(FlockrError::InvalidAccount(format!(
                    "duplicate username: {}",
                    account.username
                )));
            }
            if account.credentials.is_null() {
                return Err(FlockrError::InvalidAccount(format!(
                    "missing credentials for {}",
                    account.username
                )));
            }
        }

        Ok(())
    }

    /// Usernames in roster order.
    pub fn usernames(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.username.clone()).collect()
    }

    /// Look up an account by username.
    pub fn get(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
