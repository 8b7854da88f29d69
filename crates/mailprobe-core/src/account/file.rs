//! The accounts file.
//!
//! Accounts live in a JSON document under the user's config directory
//! (`~/.config/mailprobe/accounts.json` on Linux):
//!
//! ```json
//! {
//!   "accounts": [
//!     {
//!       "name": "Work",
//!       "email": "me@example.com",
//!       "is_default": true,
//!       "imap": {
//!         "host": "imap.example.com",
//!         "port": 993,
//!         "security": "tls",
//!         "username": "me@example.com",
//!         "auth": { "type": "password", "password": "..." }
//!       }
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::model::Account;
use crate::{Error, Result};

/// All configured accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsFile {
    /// The accounts, in file order.
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl AccountsFile {
    /// Returns the default location of the accounts file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailprobe")
            .join("accounts.json")
    }

    /// Loads the accounts file, or an empty one if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "no accounts file");
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Writes the accounts file, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        tracing::info!(path = %path.display(), "accounts saved");
        Ok(())
    }

    /// Finds an account by name (case-insensitive) or email address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if nothing matches.
    pub fn find(&self, name: &str) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name) || a.email.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::AccountNotFound(name.to_string()))
    }

    /// Returns the default account.
    ///
    /// That is the first account marked `is_default`, or the only account
    /// if there is exactly one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no account can be chosen.
    pub fn default_account(&self) -> Result<&Account> {
        if let Some(account) = self.accounts.iter().find(|a| a.is_default) {
            return Ok(account);
        }
        match self.accounts.as_slice() {
            [only] => Ok(only),
            [] => Err(Error::Config("no accounts configured".to_string())),
            _ => Err(Error::Config(
                "several accounts configured and none is marked default".to_string(),
            )),
        }
    }
}
