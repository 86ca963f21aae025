//! Configuration management.
//!
//! This module resolves where user stores live and how a user's store
//! password is derived.
//!
//! # Layout
//!
//! One encrypted file per user under a data directory:
//! `~/.rentvault/data/user_data_<sanitized email>.db`.

use crate::error::{Error, Result};
use crate::pdf::DEFAULT_PDF_API;
use crate::storage::DEFAULT_BUSY_TIMEOUT;

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RENTVAULT_DATA_DIR";

/// Environment variable enabling the isolated test directory.
pub const TEST_MODE_ENV: &str = "RENTVAULT_TEST_DB";

/// Environment variable overriding the PDF combination endpoint.
pub const PDF_API_ENV: &str = "RENTVAULT_PDF_API";

/// Get the global Rentvault directory location (`~/.rentvault/`).
#[must_use]
pub fn global_rentvault_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".rentvault"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `RENTVAULT_TEST_DB=1` (or any non-empty
/// value other than `0`/`false`). Stores then live under `~/.rentvault/test/`.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var(TEST_MODE_ENV)
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

/// Resolve the directory holding user stores.
///
/// Priority:
/// 1. `explicit_dir` (CLI `--data-dir`)
/// 2. `RENTVAULT_DATA_DIR` environment variable
/// 3. Test mode: `~/.rentvault/test/`
/// 4. Global location: `~/.rentvault/data/`
#[must_use]
pub fn resolve_data_dir(explicit_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = explicit_dir {
        return Some(dir.to_path_buf());
    }

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }

    if is_test_mode() {
        return global_rentvault_dir().map(|dir| dir.join("test"));
    }

    global_rentvault_dir().map(|dir| dir.join("data"))
}

/// File name of a user's store: `user_data_<email>.db` with every character
/// outside `[A-Za-z0-9_-]` replaced by `_`.
#[must_use]
pub fn user_db_file_name(email: &str) -> String {
    let sanitized: String = email
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("user_data_{sanitized}.db")
}

/// Resolve a user's store path.
///
/// # Errors
///
/// Returns `Error::Config` if the email is empty or no data directory can
/// be determined.
pub fn resolve_db_path(explicit_dir: Option<&Path>, email: &str) -> Result<PathBuf> {
    if email.trim().is_empty() {
        return Err(Error::Config("an email is required to locate the user store".to_string()));
    }
    let dir = resolve_data_dir(explicit_dir)
        .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))?;
    Ok(dir.join(user_db_file_name(email)))
}

/// The stable per-user store password: `<user_id>_<email>`.
#[must_use]
pub fn derive_user_password(user_id: &str, email: &str) -> String {
    format!("{}_{}", user_id.trim(), email.trim())
}

/// Endpoint of the remote PDF combination service.
#[must_use]
pub fn pdf_api_endpoint() -> String {
    std::env::var(PDF_API_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PDF_API.to_string())
}

/// Everything a [`crate::Vault`] needs to reach its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
}

impl VaultConfig {
    /// Config for an explicit store path with the default busy timeout.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Config for a user's store, resolved from the data directory rules.
    ///
    /// # Errors
    ///
    /// See [`resolve_db_path`].
    pub fn for_user(explicit_dir: Option<&Path>, email: &str) -> Result<Self> {
        resolve_db_path(explicit_dir, email).map(Self::new)
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_db_file_name() {
        assert_eq!(
            user_db_file_name("jo.doe+rent@example.com"),
            "user_data_jo_doe_rent_example_com.db"
        );
        assert_eq!(user_db_file_name("a-b_c"), "user_data_a-b_c.db");
    }

    #[test]
    fn test_explicit_dir_wins() {
        let path = resolve_db_path(Some(Path::new("/tmp/rv")), "a@b.c").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/rv/user_data_a_b_c.db"));
    }

    #[test]
    fn test_empty_email_is_config_error() {
        let err = resolve_db_path(Some(Path::new("/tmp/rv")), " ").unwrap_err();
        assert_eq!(err.error_code(), crate::error::ErrorCode::Config);
    }

    #[test]
    fn test_derive_user_password() {
        assert_eq!(derive_user_password("u123", "a@b.c"), "u123_a@b.c");
    }

    #[test]
    fn test_vault_config() {
        let config = VaultConfig::new("/tmp/x.db").with_busy_timeout(Duration::from_secs(1));
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
    }
}
