//! Store diagnostics and deletion.

use super::{print_json, vault_config};
use crate::cli::Cli;
use crate::client::Vault;
use crate::error::{Error, Result};
use colored::Colorize;
use serde::Serialize;

/// Show diagnostics about the user's store file. Needs no password.
///
/// # Errors
///
/// Returns a config error if no email is given.
pub fn info(cli: &Cli, json: bool) -> Result<()> {
    let info = Vault::new(vault_config(cli)?).database_info();

    if json {
        return print_json(&info);
    }

    println!("{}", "Store".cyan().bold());
    println!("  Path:        {}", info.path);
    if !info.exists {
        println!("  Exists:      {}", "no".yellow());
        return Ok(());
    }
    println!("  Exists:      yes");
    if let Some(size) = info.size {
        println!("  Size:        {}", crate::files::format_file_size(size));
    }
    if let Some(permissions) = &info.permissions {
        println!("  Permissions: {permissions}");
    }
    if let Some(error) = &info.error {
        println!("  Error:       {}", error.red());
    }
    Ok(())
}

#[derive(Serialize)]
struct DestroyOutput {
    path: String,
    deleted: bool,
}

/// Permanently delete the user's store.
///
/// # Errors
///
/// Returns a validation error without `--yes`, or a storage error if the
/// file cannot be removed.
pub fn destroy(cli: &Cli, yes: bool, json: bool) -> Result<()> {
    if !yes {
        return Err(Error::validation(
            "yes",
            "deleting the store is irreversible; pass --yes to confirm",
        ));
    }

    let config = vault_config(cli)?;
    let path = config.db_path.display().to_string();
    let deleted = Vault::new(config).delete_database()?;

    if json {
        return print_json(&DestroyOutput { path, deleted });
    }

    if deleted {
        println!("{} {path}", "Deleted store:".red());
    } else {
        println!("No store at {path}");
    }
    Ok(())
}
