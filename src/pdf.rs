//! Combined application PDF.
//!
//! A user picks a base PDF and an ordered set of stored documents; images
//! and PDFs among them are sent to a remote combination service, which
//! returns one merged PDF. The service is reached only through the
//! [`PdfMerger`] trait.

use crate::error::{Error, Result};
use crate::model::Entity;
use crate::storage::EncryptedStore;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use tracing::{debug, info};

/// Default combination endpoint when none is configured.
pub const DEFAULT_PDF_API: &str = "https://drakoindustries.com/api/sase/pdf/merge";

/// One stored document included in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePart {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Everything the combination service needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfBundle {
    pub base_pdf: Vec<u8>,
    pub images: Vec<BundlePart>,
    pub pdfs: Vec<BundlePart>,
}

impl PdfBundle {
    /// Section headers: image names first, then PDF names.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.images
            .iter()
            .chain(&self.pdfs)
            .map(|part| part.name.clone())
            .collect()
    }

    /// True when there is nothing to add to the base PDF.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.pdfs.is_empty()
    }
}

/// Load the documents `ids` names, in caller order.
///
/// Missing ids and documents that are neither images nor PDFs are skipped.
///
/// # Errors
///
/// Returns an error only for storage failures.
pub fn collect_pdf_bundle(store: &EncryptedStore, base_pdf: Vec<u8>, ids: &[i64]) -> Result<PdfBundle> {
    let mut bundle = PdfBundle {
        base_pdf,
        ..PdfBundle::default()
    };

    for &id in ids {
        let document = match store.get_document(id) {
            Ok(document) => document,
            Err(Error::NotFound {
                entity: Entity::Document,
                ..
            }) => {
                debug!(id, "Skipping missing document");
                continue;
            }
            Err(e) => return Err(e),
        };

        let is_image = document.is_image();
        let is_pdf = document.is_pdf();
        let part = BundlePart {
            name: document.name,
            mime_type: document.mime_type,
            data: document.data,
        };
        if is_image {
            bundle.images.push(part);
        } else if is_pdf {
            bundle.pdfs.push(part);
        } else {
            debug!(id, mime_type = %part.mime_type, "Skipping document that is neither image nor PDF");
        }
    }

    Ok(bundle)
}

/// The remote PDF combination service.
pub trait PdfMerger {
    /// Merge the bundle into one PDF, authenticating with `token`.
    fn merge(&self, bundle: PdfBundle, token: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// `PdfMerger` over HTTP multipart.
#[derive(Debug, Clone)]
pub struct HttpPdfMerger {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPdfMerger {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(bundle: PdfBundle) -> Result<Form> {
        let headers = serde_json::to_string(&bundle.headers())?;

        let mut form = Form::new()
            .part("basePdf", pdf_part(bundle.base_pdf, "base-document.pdf".to_string())?)
            .text("headers", headers);

        for (i, pdf) in bundle.pdfs.into_iter().enumerate() {
            form = form.part("additionalPdfs", pdf_part(pdf.data, format!("additional-{}.pdf", i + 1))?);
        }
        for image in bundle.images {
            let part = Part::bytes(image.data)
                .file_name(image.name)
                .mime_str(&image.mime_type)
                .map_err(|e| Error::PdfService(format!("invalid image part: {e}")))?;
            form = form.part("images", part);
        }

        Ok(form)
    }
}

fn pdf_part(data: Vec<u8>, file_name: String) -> Result<Part> {
    Part::bytes(data)
        .file_name(file_name)
        .mime_str("application/pdf")
        .map_err(|e| Error::PdfService(format!("invalid PDF part: {e}")))
}

impl PdfMerger for HttpPdfMerger {
    async fn merge(&self, bundle: PdfBundle, token: &str) -> Result<Vec<u8>> {
        info!(
            images = bundle.images.len(),
            pdfs = bundle.pdfs.len(),
            endpoint = %self.endpoint,
            "Requesting combined PDF"
        );
        let form = Self::form(bundle)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::PdfService(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::PdfService(format!("cannot read response: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Map a failed HTTP status to a service error.
#[must_use]
pub fn status_error(status: u16, body: &str) -> Error {
    let message = match status {
        401 => "Authentication failed: invalid or expired token".to_string(),
        403 => "Access denied: insufficient permissions".to_string(),
        413 => "Request too large: PDF files exceed size limit".to_string(),
        _ if body.is_empty() => format!("service returned {status}"),
        _ => format!("service returned {status}: {body}"),
    };
    Error::PdfService(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{DocumentCategory, DocumentContent, NewDocument};

    fn add(store: &mut EncryptedStore, name: &str, mime: &str) -> i64 {
        store
            .add_document(&NewDocument::new(
                name,
                DocumentCategory::Personal,
                DocumentContent::new(vec![1, 2, 3], mime),
            ))
            .unwrap()
    }

    #[test]
    fn test_collect_bundle_in_caller_order() {
        let mut store = EncryptedStore::open_memory().unwrap();
        let pdf_a = add(&mut store, "a.pdf", "application/pdf");
        let img = add(&mut store, "id.png", "image/png");
        let txt = add(&mut store, "notes.txt", "text/plain");
        let pdf_b = add(&mut store, "b.pdf", "application/pdf");

        let bundle = collect_pdf_bundle(&store, vec![9], &[pdf_b, txt, 404, img, pdf_a]).unwrap();

        assert_eq!(bundle.base_pdf, vec![9]);
        let pdfs: Vec<&str> = bundle.pdfs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(pdfs, vec!["b.pdf", "a.pdf"]);
        assert_eq!(bundle.images.len(), 1);
        assert_eq!(bundle.headers(), vec!["id.png", "b.pdf", "a.pdf"]);
    }

    #[test]
    fn test_status_errors() {
        let err = status_error(401, "");
        assert_eq!(err.error_code(), ErrorCode::PdfService);
        assert!(err.to_string().contains("Authentication failed"));
        assert!(status_error(413, "").to_string().contains("too large"));
        assert!(status_error(500, "boom").to_string().contains("500: boom"));
    }

    #[test]
    fn test_form_builds() {
        let bundle = PdfBundle {
            base_pdf: vec![1],
            images: vec![BundlePart {
                name: "id.png".to_string(),
                mime_type: "image/png".to_string(),
                data: vec![2],
            }],
            pdfs: Vec::new(),
        };
        assert!(HttpPdfMerger::form(bundle).is_ok());
    }
}
