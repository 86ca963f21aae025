//! Document command implementations.

use super::{DeletedOutput, IdOutput, open_vault, optional_date, print_json, truncate};
use crate::cli::{Cli, DocumentCommands};
use crate::error::{Error, Result};
use crate::files::{document_data_url, format_file_size, read_file_as_blob};
use crate::model::{DocumentContent, DocumentPatch, DocumentSummary, Patch};
use crate::validate::normalize_document_category;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct DocumentListOutput {
    documents: Vec<DocumentSummary>,
    count: usize,
}

#[derive(Serialize)]
struct DocumentShowOutput {
    document: DocumentSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<String>,
}

/// Execute document commands.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the operation fails.
pub fn execute(command: &DocumentCommands, cli: &Cli, json: bool) -> Result<()> {
    match command {
        DocumentCommands::Add {
            path,
            name,
            document_type,
            reminder,
        } => add(cli, path, name.as_deref(), document_type, reminder.as_deref(), json),
        DocumentCommands::List { document_type } => list(cli, document_type.as_deref(), json),
        DocumentCommands::Show { id, out, data_url } => {
            show(cli, *id, out.as_deref(), *data_url, json)
        }
        DocumentCommands::Update {
            id,
            name,
            document_type,
            reminder,
            clear_reminder,
            file,
        } => {
            let reminder_date = if *clear_reminder {
                Patch::Clear
            } else {
                optional_date("reminder_date", reminder.as_deref())?.map_or(Patch::Keep, Patch::Set)
            };
            let patch = DocumentPatch {
                name: name.clone(),
                document_type: document_type
                    .as_deref()
                    .map(normalize_document_category)
                    .transpose()?,
                reminder_date,
                content: file
                    .as_deref()
                    .map(read_file_as_blob)
                    .transpose()?
                    .map(DocumentContent::from),
            };
            update(cli, *id, patch, json)
        }
        DocumentCommands::Delete { id } => delete(cli, *id, json),
    }
}

fn add(
    cli: &Cli,
    path: &Path,
    name: Option<&str>,
    document_type: &str,
    reminder: Option<&str>,
    json: bool,
) -> Result<()> {
    let category = normalize_document_category(document_type)?;
    let reminder = optional_date("reminder_date", reminder)?;

    let id = open_vault(cli)?.upload_file(path, name, category, reminder)?;

    if json {
        print_json(&IdOutput { id })
    } else {
        println!("Stored document #{id} [{category}]");
        Ok(())
    }
}

fn list(cli: &Cli, document_type: Option<&str>, json: bool) -> Result<()> {
    let category = document_type.map(normalize_document_category).transpose()?;

    let vault = open_vault(cli)?;
    let documents = match category {
        Some(category) => vault.list_documents_by_category(category)?,
        None => vault.list_document_summaries()?,
    };

    if json {
        return print_json(&DocumentListOutput {
            count: documents.len(),
            documents,
        });
    }

    if documents.is_empty() {
        println!("No documents stored.");
        return Ok(());
    }

    println!("Documents ({}):", documents.len());
    println!();
    for doc in &documents {
        let reminder = doc
            .reminder_date
            .map(|d| format!("  ⏰ {d}").dimmed().to_string())
            .unwrap_or_default();
        println!(
            "#{:<4} {:<40} {:<9} {:>10}{reminder}",
            doc.id,
            truncate(&doc.name, 40),
            doc.document_type.label(),
            format_file_size(doc.size),
        );
    }
    Ok(())
}

fn show(cli: &Cli, id: i64, out: Option<&Path>, want_data_url: bool, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let document = vault.get_document(id)?;

    let written_to = match out {
        Some(path) => {
            fs::write(path, &document.data)?;
            Some(path.display().to_string())
        }
        None => None,
    };
    let data_url = if want_data_url {
        Some(document_data_url(&document).ok_or_else(|| {
            Error::validation("data", "document has no content to preview")
        })?)
    } else {
        None
    };
    let summary = document.summary();

    if json {
        return print_json(&DocumentShowOutput {
            document: summary,
            data_url,
            written_to,
        });
    }

    println!("{} {}", format!("#{}", summary.id).bold(), summary.name.bold());
    println!("  Type:     {}", summary.document_type);
    println!("  MIME:     {}", summary.mime_type);
    println!("  Size:     {}", format_file_size(summary.size));
    if let Some(date) = summary.reminder_date {
        println!("  Reminder: {date}");
    }
    if let Some(path) = written_to {
        println!("  Written to {path}");
    }
    if let Some(url) = data_url {
        println!("{url}");
    }
    Ok(())
}

fn update(cli: &Cli, id: i64, patch: DocumentPatch, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    vault.update_document(id, patch)?;

    if json {
        print_json(&IdOutput { id })
    } else {
        println!("Updated document #{id}");
        Ok(())
    }
}

fn delete(cli: &Cli, id: i64, json: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    vault.delete_document(id)?;

    if json {
        print_json(&DeletedOutput { id, deleted: true })
    } else {
        println!("Deleted document #{id}");
        Ok(())
    }
}
