//! Command implementations.

pub mod completions;
pub mod document;
pub mod init;
pub mod listing;
pub mod pdf;
pub mod profile;
pub mod task;
pub mod vault;
pub mod version;

use crate::cli::Cli;
use crate::client::{InitOutcome, Vault};
use crate::config::{VaultConfig, derive_user_password};
use crate::error::{Error, Result};
use crate::validate::parse_date;
use chrono::NaiveDate;
use serde::Serialize;

/// Store location for the user named on the command line.
pub(crate) fn vault_config(cli: &Cli) -> Result<VaultConfig> {
    let email = cli
        .email
        .as_deref()
        .ok_or_else(|| Error::Config("--email (or RV_EMAIL) is required".to_string()))?;
    VaultConfig::for_user(cli.data_dir.as_deref(), email)
}

/// The store password: `--password` if given, otherwise derived from the
/// user id and email.
fn store_password(cli: &Cli) -> Result<String> {
    if let Some(password) = &cli.password {
        return Ok(password.clone());
    }
    match (&cli.user_id, &cli.email) {
        (Some(user_id), Some(email)) => Ok(derive_user_password(user_id, email)),
        _ => Err(Error::Config(
            "--user-id (or RV_USER_ID) or --password is required to unlock the store".to_string(),
        )),
    }
}

/// Open and unlock the user's store.
pub(crate) fn unlock(cli: &Cli) -> Result<(Vault, InitOutcome)> {
    let vault = Vault::new(vault_config(cli)?);
    let outcome = vault.initialize(&store_password(cli)?)?;
    Ok((vault, outcome))
}

pub(crate) fn open_vault(cli: &Cli) -> Result<Vault> {
    unlock(cli).map(|(vault, _)| vault)
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub(crate) fn optional_date(field: &'static str, input: Option<&str>) -> Result<Option<NaiveDate>> {
    input.map(|s| parse_date(field, s)).transpose()
}

/// Output for commands that only report an id.
#[derive(Serialize)]
pub(crate) struct IdOutput {
    pub id: i64,
}

/// Output for delete commands.
#[derive(Serialize)]
pub(crate) struct DeletedOutput {
    pub id: i64,
    pub deleted: bool,
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
