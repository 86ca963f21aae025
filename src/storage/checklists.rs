//! Checklist repository.

use crate::error::{Error, Result};
use crate::model::{ChecklistPatch, ChecklistTask, Entity, NewChecklistTask};
use crate::storage::EncryptedStore;
use crate::storage::codec::{Cell, decode_date, decode_list, encode_date, encode_list};
use crate::storage::update::Update;
use crate::validate::{require_text, validate_task_references};
use rusqlite::OptionalExtension;

const TASK_COLUMNS: &str =
    "id, task_name, is_checked, document_references, reminder_date, created_at, updated_at";

impl EncryptedStore {
    /// Create a task. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name or a link without a URL.
    pub fn add_task(&mut self, task: &NewChecklistTask) -> Result<i64> {
        require_text("task_name", &task.task_name)?;
        validate_task_references(&task.document_references)?;
        let references = encode_list(&task.document_references)?;
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("add_task", |tx| {
            tx.execute(
                "INSERT INTO checklists (task_name, is_checked, document_references, reminder_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![
                    task.task_name,
                    task.is_checked,
                    references,
                    task.reminder_date.map(encode_date),
                    now,
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Get a task.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no task has this id.
    pub fn get_task(&self, id: i64) -> Result<ChecklistTask> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM checklists WHERE id = ?1");
        self.conn()
            .query_row(&sql, [id], map_task_row)
            .optional()?
            .ok_or(Error::NotFound {
                entity: Entity::Checklist,
                id,
            })
    }

    /// All tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tasks(&self) -> Result<Vec<ChecklistTask>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM checklists ORDER BY created_at DESC, id DESC");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], map_task_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing id, or a validation error for the
    /// fields being set.
    pub fn update_task(&mut self, id: i64, patch: ChecklistPatch) -> Result<()> {
        if let Some(name) = &patch.task_name {
            require_text("task_name", name)?;
        }
        if let Some(references) = &patch.document_references {
            validate_task_references(references)?;
        }
        let now = chrono::Utc::now().timestamp_millis();

        let mut update = Update::new("checklists");
        update.set("task_name", patch.task_name);
        update.set("is_checked", patch.is_checked);
        update.set(
            "document_references",
            patch
                .document_references
                .map(|refs| encode_list(&refs))
                .transpose()?,
        );
        update.patch("reminder_date", patch.reminder_date.map(encode_date));

        self.mutate("update_task", |tx| {
            if update.execute(tx, id, now)? == 0 {
                return Err(Error::NotFound {
                    entity: Entity::Checklist,
                    id,
                });
            }
            Ok(())
        })
    }

    /// Delete a task.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no task has this id.
    pub fn delete_task(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_task", |tx| {
            let rows = tx.execute("DELETE FROM checklists WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(Error::NotFound {
                    entity: Entity::Checklist,
                    id,
                });
            }
            Ok(())
        })
    }

    /// Flip a task's completion in one transaction. Returns the persisted state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no task has this id.
    pub fn toggle_task_completion(&mut self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("toggle_task_completion", |tx| {
            let rows = tx.execute(
                "UPDATE checklists SET is_checked = 1 - is_checked, updated_at = ?1 WHERE id = ?2",
                rusqlite::params![now, id],
            )?;
            if rows == 0 {
                return Err(Error::NotFound {
                    entity: Entity::Checklist,
                    id,
                });
            }
            let checked: bool = tx.query_row(
                "SELECT is_checked FROM checklists WHERE id = ?1",
                [id],
                |row| row.get(0),
            )?;
            Ok(checked)
        })
    }
}

// Helper to map checklist rows
fn map_task_row(row: &rusqlite::Row) -> rusqlite::Result<ChecklistTask> {
    let id: i64 = row.get(0)?;
    Ok(ChecklistTask {
        id,
        task_name: row.get(1)?,
        is_checked: row.get(2)?,
        document_references: decode_list(
            row.get(3)?,
            Cell::new("checklists", "document_references", id),
        ),
        reminder_date: decode_date(row.get(4)?, Cell::new("checklists", "reminder_date", id)),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{DocumentReference, Patch};

    #[test]
    fn test_task_crud() {
        let mut store = EncryptedStore::open_memory().unwrap();

        let mut task = NewChecklistTask::new("Gather pay stubs");
        task.document_references = vec![
            DocumentReference::file("3", "march.pdf"),
            DocumentReference::link("l1", "Bank portal", "https://bank.example"),
        ];
        let id = store.add_task(&task).unwrap();

        let stored = store.get_task(id).unwrap();
        assert_eq!(stored.document_references, task.document_references);
        assert!(!stored.is_checked);

        store
            .update_task(
                id,
                ChecklistPatch {
                    task_name: Some("Gather 3 pay stubs".to_string()),
                    document_references: Some(Vec::new()),
                    reminder_date: Patch::Keep,
                    ..ChecklistPatch::default()
                },
            )
            .unwrap();
        let stored = store.get_task(id).unwrap();
        assert_eq!(stored.task_name, "Gather 3 pay stubs");
        assert!(stored.document_references.is_empty());

        store.delete_task(id).unwrap();
        assert_eq!(store.get_task(id).unwrap_err().error_code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let id = store.add_task(&NewChecklistTask::new("Call landlord")).unwrap();

        let first = store.toggle_task_completion(id).unwrap();
        assert!(first);
        assert_eq!(store.get_task(id).unwrap().is_checked, first);

        let second = store.toggle_task_completion(id).unwrap();
        assert!(!second);
        assert_eq!(store.get_task(id).unwrap().is_checked, second);
    }

    #[test]
    fn test_link_without_url_rejected() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let mut task = NewChecklistTask::new("Upload");
        let mut link = DocumentReference::link("x", "portal", "https://x");
        link.url = None;
        task.document_references = vec![link];

        let err = store.add_task(&task).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Validation);
        assert!(store.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_references_fail_closed() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let id = store.add_task(&NewChecklistTask::new("Check")).unwrap();
        store
            .conn()
            .execute(
                "UPDATE checklists SET document_references = '[{\"id\":1}]' WHERE id = ?1",
                [id],
            )
            .unwrap();

        assert!(store.get_task(id).unwrap().document_references.is_empty());
    }
}
