//! Document model for Rentvault.
//!
//! The encrypted store is the sole owner of a document's bytes; no file path
//! is ever persisted alongside them.

use super::Patch;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// UI-level categorization of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentCategory {
    Personal,
    Listing,
    General,
    Other,
}

impl DocumentCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 4] = [Self::Personal, Self::Listing, Self::General, Self::Other];

    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Listing => "listing",
            Self::General => "general",
            Self::Other => "other",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Listing => "Listing",
            Self::General => "General",
            Self::Other => "Other",
        }
    }

    /// Parse the stored spelling.
    #[must_use]
    pub fn from_stored(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored document, bytes included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub document_type: DocumentCategory,
    pub mime_type: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub data: Vec<u8>,
    pub reminder_date: Option<NaiveDate>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Document {
    /// Whether the content is an image, judged by MIME type only.
    #[must_use]
    pub fn is_image(&self) -> bool {
        crate::files::is_image_mime(&self.mime_type)
    }

    /// Whether the content is a PDF, judged by MIME type only.
    #[must_use]
    pub fn is_pdf(&self) -> bool {
        crate::files::is_pdf_mime(&self.mime_type)
    }

    /// Content size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Metadata view without the bytes.
    #[must_use]
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            name: self.name.clone(),
            document_type: self.document_type,
            mime_type: self.mime_type.clone(),
            size: self.size(),
            reminder_date: self.reminder_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Document metadata plus byte size, read without loading the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub name: String,
    pub document_type: DocumentCategory,
    pub mime_type: String,
    pub size: u64,
    pub reminder_date: Option<NaiveDate>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DocumentSummary {
    #[must_use]
    pub fn is_image(&self) -> bool {
        crate::files::is_image_mime(&self.mime_type)
    }

    #[must_use]
    pub fn is_pdf(&self) -> bool {
        crate::files::is_pdf_mime(&self.mime_type)
    }
}

/// Bytes and their MIME type. Always written together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl DocumentContent {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }
}

impl From<crate::files::FileBlob> for DocumentContent {
    fn from(blob: crate::files::FileBlob) -> Self {
        Self {
            data: blob.data,
            mime_type: blob.mime_type,
        }
    }
}

/// Fields supplied when uploading a document.
///
/// `data` and `mime_type` are optional here only so that a caller supplying
/// one without the other gets a `ValidationError` instead of a type error at
/// some distant boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub name: String,
    pub document_type: DocumentCategory,
    pub mime_type: Option<String>,
    pub data: Option<Vec<u8>>,
    pub reminder_date: Option<NaiveDate>,
}

impl NewDocument {
    /// A document with its content attached.
    pub fn new(
        name: impl Into<String>,
        document_type: DocumentCategory,
        content: DocumentContent,
    ) -> Self {
        Self {
            name: name.into(),
            document_type,
            mime_type: Some(content.mime_type),
            data: Some(content.data),
            reminder_date: None,
        }
    }

    #[must_use]
    pub fn with_reminder(mut self, date: NaiveDate) -> Self {
        self.reminder_date = Some(date);
        self
    }
}

/// Partial update of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub name: Option<String>,
    pub document_type: Option<DocumentCategory>,
    pub reminder_date: Patch<NaiveDate>,
    pub content: Option<DocumentContent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_storage_spelling() {
        for category in DocumentCategory::ALL {
            assert_eq!(DocumentCategory::from_stored(category.as_str()), Some(category));
        }
        assert_eq!(DocumentCategory::from_stored("passport"), None);
    }

    #[test]
    fn test_document_kind_from_mime_type() {
        let doc = Document {
            id: 1,
            name: "lease".to_string(),
            document_type: DocumentCategory::Listing,
            mime_type: "application/pdf".to_string(),
            data: vec![1, 2, 3],
            reminder_date: None,
            created_at: 0,
            updated_at: 0,
        };
        assert!(doc.is_pdf());
        assert!(!doc.is_image());

        let summary = doc.summary();
        assert_eq!(summary.size, 3);
        assert!(summary.is_pdf());
    }

    #[test]
    fn test_document_json_omits_bytes() {
        let doc = Document {
            id: 2,
            name: "id card".to_string(),
            document_type: DocumentCategory::Personal,
            mime_type: "image/png".to_string(),
            data: vec![0; 16],
            reminder_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["document_type"], "Personal");
        assert_eq!(json["reminder_date"], "2026-03-01");
    }
}
