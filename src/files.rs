//! File ingestion and pure document helpers.
//!
//! Reading a dropped file is the one place the crate touches the local
//! filesystem outside the encrypted store. Everything else here is derived
//! from the MIME type alone; there is no content sniffing.

use crate::error::{Error, Result};
use crate::model::Document;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::Path;
use tracing::info;

/// Largest file accepted for ingestion.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Fallback when the extension is unknown.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Bytes read from disk plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Read a local file for upload.
///
/// # Errors
///
/// Returns `FileRead` when the file is missing or unreadable, and a
/// validation error for directories and files above [`MAX_FILE_SIZE`].
pub fn read_file_as_blob(path: &Path) -> Result<FileBlob> {
    let file_err = |source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let meta = fs::metadata(path).map_err(file_err)?;
    if meta.is_dir() {
        return Err(Error::validation("path", format!("{} is a directory", path.display())));
    }
    if meta.len() > MAX_FILE_SIZE {
        return Err(Error::validation(
            "path",
            format!(
                "{} is {}, above the {} limit",
                path.display(),
                format_file_size(meta.len()),
                format_file_size(MAX_FILE_SIZE)
            ),
        ));
    }

    let data = fs::read(path).map_err(file_err)?;
    let mime_type = mime_type_for_path(path).to_string();
    info!(path = %path.display(), size = data.len(), mime_type = %mime_type, "Read file for upload");

    Ok(FileBlob { data, mime_type })
}

/// MIME type from the file extension (case-insensitive).
#[must_use]
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "zip" => "application/zip",
        "rar" => "application/x-rar-compressed",
        "7z" => "application/x-7z-compressed",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => DEFAULT_MIME_TYPE,
    }
}

#[must_use]
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

#[must_use]
pub fn is_pdf_mime(mime_type: &str) -> bool {
    mime_type == "application/pdf"
}

/// A `data:` URL for previewing the document, or `None` when it has no
/// bytes or no MIME type.
#[must_use]
pub fn document_data_url(document: &Document) -> Option<String> {
    if document.data.is_empty() || document.mime_type.is_empty() {
        return None;
    }
    Some(format!(
        "data:{};base64,{}",
        document.mime_type,
        STANDARD.encode(&document.data)
    ))
}

/// Human-readable size: 1024-based, two decimals with trailing zeros
/// trimmed, capped at GB.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::DocumentCategory;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(mime_type_for_path(Path::new("lease.PDF")), "application/pdf");
        assert_eq!(mime_type_for_path(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("noext")), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_path(Path::new("x.weird")), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_read_file_as_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.png");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let blob = read_file_as_blob(&path).unwrap();
        assert_eq!(blob.mime_type, "image/png");
        assert_eq!(blob.data.len(), 4);

        let missing = read_file_as_blob(&dir.path().join("missing.pdf")).unwrap_err();
        assert_eq!(missing.error_code(), ErrorCode::FileRead);

        let directory = read_file_as_blob(dir.path()).unwrap_err();
        assert_eq!(directory.error_code(), ErrorCode::Validation);
    }

    #[test]
    fn test_document_data_url() {
        let mut doc = Document {
            id: 1,
            name: "a.txt".to_string(),
            document_type: DocumentCategory::General,
            mime_type: "text/plain".to_string(),
            data: b"hi".to_vec(),
            reminder_date: None,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(document_data_url(&doc).as_deref(), Some("data:text/plain;base64,aGk="));

        doc.data.clear();
        assert!(document_data_url(&doc).is_none());
    }

    #[test]
    fn test_mime_predicates() {
        assert!(is_image_mime("image/webp"));
        assert!(!is_image_mime("application/pdf"));
        assert!(is_pdf_mime("application/pdf"));
    }
}
