//! Document repository.
//!
//! Bytes and MIME type are validated together and written in the same
//! statement as the metadata, so a document row is never visible without
//! its content.

use crate::error::{Error, Result};
use crate::model::{
    Document, DocumentCategory, DocumentPatch, DocumentSummary, Entity, NewDocument,
};
use crate::storage::EncryptedStore;
use crate::storage::codec::{Cell, decode_date, decode_enum, encode_date};
use crate::storage::update::Update;
use crate::validate::{require_text, validate_document_content};
use rusqlite::OptionalExtension;
use tracing::{debug, info};

const DOCUMENT_COLUMNS: &str =
    "id, name, document_type, mime_type, data, reminder_date, created_at, updated_at";

const SUMMARY_COLUMNS: &str =
    "id, name, document_type, mime_type, length(data), reminder_date, created_at, updated_at";

impl EncryptedStore {
    /// Store a document. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless name, bytes and MIME type are all
    /// present; no row is written in that case.
    pub fn add_document(&mut self, document: &NewDocument) -> Result<i64> {
        require_text("name", &document.name)?;
        validate_document_content(document.data.as_deref(), document.mime_type.as_deref())?;
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("add_document", |tx| {
            tx.execute(
                "INSERT INTO documents (name, document_type, mime_type, data, reminder_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                rusqlite::params![
                    document.name,
                    document.document_type.as_str(),
                    document.mime_type,
                    document.data,
                    document.reminder_date.map(encode_date),
                    now,
                ],
            )?;

            let id = tx.last_insert_rowid();
            info!(
                id,
                size = document.data.as_ref().map_or(0, Vec::len),
                "Stored document"
            );
            Ok(id)
        })
    }

    /// Get a document with its bytes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no document has this id.
    pub fn get_document(&self, id: i64) -> Result<Document> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1");
        self.conn()
            .query_row(&sql, [id], map_document_row)
            .optional()?
            .ok_or(Error::NotFound {
                entity: Entity::Document,
                id,
            })
    }

    /// All documents with their bytes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY created_at DESC, id DESC");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], map_document_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// All document metadata with byte sizes, without loading any blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_document_summaries(&self) -> Result<Vec<DocumentSummary>> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM documents ORDER BY created_at DESC, id DESC");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], map_summary_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Documents of one category, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_documents_by_category(&self, category: DocumentCategory) -> Result<Vec<DocumentSummary>> {
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS} FROM documents WHERE document_type = ?1
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([category.as_str()], map_summary_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Apply a partial update. New content replaces bytes and MIME type together.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing id, or a validation error for an
    /// empty name or empty content.
    pub fn update_document(&mut self, id: i64, patch: DocumentPatch) -> Result<()> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(content) = &patch.content {
            validate_document_content(Some(&content.data), Some(&content.mime_type))?;
        }
        let now = chrono::Utc::now().timestamp_millis();

        let mut update = Update::new("documents");
        update.set("name", patch.name);
        update.set("document_type", patch.document_type.map(|c| c.as_str()));
        update.patch("reminder_date", patch.reminder_date.map(encode_date));
        if let Some(content) = patch.content {
            update.set("mime_type", Some(content.mime_type));
            update.set("data", Some(content.data));
        }

        self.mutate("update_document", |tx| {
            if update.execute(tx, id, now)? == 0 {
                return Err(Error::NotFound {
                    entity: Entity::Document,
                    id,
                });
            }
            Ok(())
        })
    }

    /// Delete a document.
    ///
    /// Listings that reference it keep the now-dangling id; readers filter it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no document has this id.
    pub fn delete_document(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_document", |tx| {
            let rows = tx.execute("DELETE FROM documents WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(Error::NotFound {
                    entity: Entity::Document,
                    id,
                });
            }
            debug!(id, "Deleted document");
            Ok(())
        })
    }
}

fn decode_category(raw: String, id: i64) -> DocumentCategory {
    decode_enum(
        Some(raw),
        DocumentCategory::from_stored,
        Cell::new("documents", "document_type", id),
    )
    .unwrap_or(DocumentCategory::Other)
}

// Helper to map document rows
fn map_document_row(row: &rusqlite::Row) -> rusqlite::Result<Document> {
    let id: i64 = row.get(0)?;
    Ok(Document {
        id,
        name: row.get(1)?,
        document_type: decode_category(row.get(2)?, id),
        mime_type: row.get(3)?,
        data: row.get(4)?,
        reminder_date: decode_date(row.get(5)?, Cell::new("documents", "reminder_date", id)),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

// Helper to map summary rows
fn map_summary_row(row: &rusqlite::Row) -> rusqlite::Result<DocumentSummary> {
    let id: i64 = row.get(0)?;
    let size: i64 = row.get(4)?;
    Ok(DocumentSummary {
        id,
        name: row.get(1)?,
        document_type: decode_category(row.get(2)?, id),
        mime_type: row.get(3)?,
        size: u64::try_from(size).unwrap_or_default(),
        reminder_date: decode_date(row.get(5)?, Cell::new("documents", "reminder_date", id)),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{DocumentContent, Patch};
    use chrono::NaiveDate;

    fn pdf(name: &str) -> NewDocument {
        NewDocument::new(
            name,
            DocumentCategory::Personal,
            DocumentContent::new(b"%PDF-1.7 body".to_vec(), "application/pdf"),
        )
    }

    #[test]
    fn test_document_crud() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let reminder = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();

        let id = store.add_document(&pdf("paystub.pdf").with_reminder(reminder)).unwrap();
        let doc = store.get_document(id).unwrap();
        assert_eq!(doc.name, "paystub.pdf");
        assert_eq!(doc.data, b"%PDF-1.7 body");
        assert_eq!(doc.reminder_date, Some(reminder));
        assert_eq!(doc.created_at, doc.updated_at);

        store
            .update_document(
                id,
                DocumentPatch {
                    name: Some("paystub-march.pdf".to_string()),
                    reminder_date: Patch::Clear,
                    content: Some(DocumentContent::new(vec![0x89, 0x50], "image/png")),
                    ..DocumentPatch::default()
                },
            )
            .unwrap();
        let doc = store.get_document(id).unwrap();
        assert_eq!(doc.name, "paystub-march.pdf");
        assert_eq!(doc.mime_type, "image/png");
        assert_eq!(doc.data, vec![0x89, 0x50]);
        assert!(doc.reminder_date.is_none());
        assert_eq!(doc.document_type, DocumentCategory::Personal);

        store.delete_document(id).unwrap();
        assert_eq!(store.get_document(id).unwrap_err().error_code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_partial_content_leaves_no_row() {
        let mut store = EncryptedStore::open_memory().unwrap();

        let mut missing_mime = pdf("a.pdf");
        missing_mime.mime_type = None;
        let err = store.add_document(&missing_mime).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Validation);

        let mut missing_data = pdf("b.pdf");
        missing_data.data = None;
        assert_eq!(
            store.add_document(&missing_data).unwrap_err().error_code(),
            ErrorCode::Validation
        );

        assert!(store.list_documents().unwrap().is_empty());
    }

    #[test]
    fn test_summaries_report_size() {
        let mut store = EncryptedStore::open_memory().unwrap();
        store.add_document(&pdf("a.pdf")).unwrap();

        let summaries = store.list_document_summaries().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].size, 13);
        assert!(summaries[0].is_pdf());

        assert_eq!(
            store
                .list_documents_by_category(DocumentCategory::Personal)
                .unwrap()
                .len(),
            1
        );
        assert!(store
            .list_documents_by_category(DocumentCategory::Listing)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_missing_document() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let err = store.update_document(9, DocumentPatch::default()).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotFound);
    }
}
