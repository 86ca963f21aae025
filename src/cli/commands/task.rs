//! Checklist command implementations.

use super::{DeletedOutput, IdOutput, open_vault, optional_date, print_json};
use crate::cli::{Cli, TaskAttachments, TaskCommands};
use crate::client::Vault;
use crate::error::{Error, Result};
use crate::model::{ChecklistPatch, ChecklistTask, DocumentReference, NewChecklistTask, Patch};
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct TaskListOutput {
    tasks: Vec<ChecklistTask>,
    count: usize,
    completed: usize,
}

#[derive(Serialize)]
struct ToggleOutput {
    id: i64,
    is_checked: bool,
}

/// Execute checklist commands.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the operation fails.
pub fn execute(command: &TaskCommands, cli: &Cli, json: bool) -> Result<()> {
    match command {
        TaskCommands::Add {
            name,
            checked,
            attachments,
            reminder,
        } => {
            let reminder = optional_date("reminder_date", reminder.as_deref())?;
            let vault = open_vault(cli)?;
            let task = NewChecklistTask {
                is_checked: *checked,
                document_references: references(&vault, attachments)?,
                reminder_date: reminder,
                ..NewChecklistTask::new(name.as_str())
            };
            let id = vault.add_task(&task)?;
            if json {
                print_json(&IdOutput { id })
            } else {
                println!("Added task #{id}: {name}");
                Ok(())
            }
        }
        TaskCommands::List => list(cli, json),
        TaskCommands::Show { id } => show(cli, *id, json),
        TaskCommands::Update {
            id,
            name,
            checked,
            attachments,
            clear_attachments,
            reminder,
            clear_reminder,
        } => {
            let reminder_date = if *clear_reminder {
                Patch::Clear
            } else {
                optional_date("reminder_date", reminder.as_deref())?.map_or(Patch::Keep, Patch::Set)
            };
            let vault = open_vault(cli)?;
            let document_references = if *clear_attachments {
                Some(Vec::new())
            } else if attachments.documents.is_empty() && attachments.links.is_empty() {
                None
            } else {
                Some(references(&vault, attachments)?)
            };
            vault.update_task(
                *id,
                ChecklistPatch {
                    task_name: name.clone(),
                    is_checked: *checked,
                    document_references,
                    reminder_date,
                },
            )?;
            if json {
                print_json(&IdOutput { id: *id })
            } else {
                println!("Updated task #{id}");
                Ok(())
            }
        }
        TaskCommands::Toggle { id } => {
            let vault = open_vault(cli)?;
            let is_checked = vault.toggle_task_completion(*id)?;
            if json {
                print_json(&ToggleOutput { id: *id, is_checked })
            } else {
                let mark = if is_checked { "✓ done" } else { "○ open" };
                println!("Task #{id} {mark}");
                Ok(())
            }
        }
        TaskCommands::Delete { id } => {
            open_vault(cli)?.delete_task(*id)?;
            if json {
                print_json(&DeletedOutput { id: *id, deleted: true })
            } else {
                println!("Deleted task #{id}");
                Ok(())
            }
        }
    }
}

/// Resolve `--doc` ids to file attachments and parse `--link NAME=URL`.
fn references(vault: &Vault, attachments: &TaskAttachments) -> Result<Vec<DocumentReference>> {
    let mut refs = Vec::with_capacity(attachments.documents.len() + attachments.links.len());

    for &id in &attachments.documents {
        let document = vault.get_document(id)?;
        refs.push(DocumentReference::file(id.to_string(), document.name));
    }
    for (i, link) in attachments.links.iter().enumerate() {
        refs.push(parse_link(i, link)?);
    }

    Ok(refs)
}

fn parse_link(index: usize, input: &str) -> Result<DocumentReference> {
    let (name, url) = input
        .split_once('=')
        .filter(|(name, url)| !name.trim().is_empty() && !url.trim().is_empty())
        .ok_or_else(|| Error::validation("link", format!("expected NAME=URL, got '{input}'")))?;
    Ok(DocumentReference::link(
        format!("link-{}", index + 1),
        name.trim(),
        url.trim(),
    ))
}

fn list(cli: &Cli, json: bool) -> Result<()> {
    let tasks = open_vault(cli)?.list_tasks()?;
    let completed = tasks.iter().filter(|t| t.is_checked).count();

    if json {
        return print_json(&TaskListOutput {
            count: tasks.len(),
            completed,
            tasks,
        });
    }

    if tasks.is_empty() {
        println!("No checklist tasks.");
        return Ok(());
    }

    println!("Checklist ({completed}/{} done):", tasks.len());
    println!();
    for task in &tasks {
        let mark = if task.is_checked {
            "✓".green().to_string()
        } else {
            "○".to_string()
        };
        let attachments = if task.document_references.is_empty() {
            String::new()
        } else {
            format!(" 📎{}", task.document_references.len())
        };
        println!("{mark} #{:<4} {}{attachments}", task.id, task.task_name);
    }
    Ok(())
}

fn show(cli: &Cli, id: i64, json: bool) -> Result<()> {
    let task = open_vault(cli)?.get_task(id)?;

    if json {
        return print_json(&task);
    }

    let state = if task.is_checked { "done" } else { "open" };
    println!("{} {} ({state})", format!("#{}", task.id).bold(), task.task_name.bold());
    if let Some(date) = task.reminder_date {
        println!("  Reminder: {date}");
    }
    for reference in &task.document_references {
        match &reference.url {
            Some(url) => println!("  🔗 {} <{url}>", reference.name),
            None => println!("  📄 {} [{}]", reference.name, reference.kind.as_str()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttachmentKind;

    #[test]
    fn test_parse_link() {
        let link = parse_link(0, "Pay stub = https://example.com/stub").unwrap();
        assert_eq!(link.kind, AttachmentKind::Link);
        assert_eq!(link.name, "Pay stub");
        assert_eq!(link.url.as_deref(), Some("https://example.com/stub"));
        assert_eq!(link.id, "link-1");

        assert!(parse_link(0, "no-url").is_err());
        assert!(parse_link(0, "name=").is_err());
    }
}
