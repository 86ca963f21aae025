//! Create or unlock a user's encrypted store.
//!
//! Each user gets one SQLCipher file under the data directory, named after
//! their email. The first `rv init` creates it with the schema in place;
//! later runs only verify that the password still opens it.

use super::{unlock, vault_config};
use crate::cli::Cli;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct InitOutput {
    path: PathBuf,
    created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cipher_version: Option<String>,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an initialization error if the password does not open an
/// existing store or the directory is not writable.
pub fn execute(cli: &Cli, json: bool) -> Result<()> {
    let path = vault_config(cli)?.db_path;
    let created = !path.exists();

    let (_vault, outcome) = unlock(cli)?;

    let output = InitOutput {
        path,
        created,
        cipher_version: outcome.cipher_version,
    };

    if json {
        return super::print_json(&output);
    }

    if output.created {
        println!("{} {}", "Created encrypted store:".green(), output.path.display());
    } else {
        println!("{} {}", "Unlocked store:".green(), output.path.display());
    }
    if let Some(version) = &output.cipher_version {
        println!("  SQLCipher {version}");
    }
    Ok(())
}
