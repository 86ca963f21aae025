//! Checklist task model for Rentvault.

use super::Patch;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a task attachment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    File,
    Folder,
    Link,
}

impl AttachmentKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a task's attachment list.
///
/// This is a denormalized record, not a foreign key: `id` is whatever the
/// caller used to identify the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DocumentReference {
    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: AttachmentKind::File,
            url: None,
        }
    }

    pub fn link(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: AttachmentKind::Link,
            url: Some(url.into()),
        }
    }
}

/// A stored rental-application task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTask {
    pub id: i64,
    pub task_name: String,
    pub is_checked: bool,
    pub document_references: Vec<DocumentReference>,
    pub reminder_date: Option<NaiveDate>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewChecklistTask {
    pub task_name: String,
    pub is_checked: bool,
    pub document_references: Vec<DocumentReference>,
    pub reminder_date: Option<NaiveDate>,
}

impl NewChecklistTask {
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistPatch {
    pub task_name: Option<String>,
    pub is_checked: Option<bool>,
    /// An empty list clears the attachments.
    pub document_references: Option<Vec<DocumentReference>>,
    pub reminder_date: Patch<NaiveDate>,
}
