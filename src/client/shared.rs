//! Async access to a [`Vault`].
//!
//! Store calls are synchronous and may block on the file lock; async
//! callers run them on the blocking pool through [`SharedVault::run`].

use super::{InitOutcome, Vault};
use crate::error::{Error, Result};
use crate::pdf::PdfMerger;
use std::sync::Arc;
use tracing::debug;

/// Cloneable handle sharing one [`Vault`] across tasks.
#[derive(Debug, Clone)]
pub struct SharedVault {
    inner: Arc<Vault>,
}

impl From<Vault> for SharedVault {
    fn from(vault: Vault) -> Self {
        Self::new(vault)
    }
}

impl SharedVault {
    #[must_use]
    pub fn new(vault: Vault) -> Self {
        Self {
            inner: Arc::new(vault),
        }
    }

    /// Borrow the vault for a synchronous call on the current thread.
    #[must_use]
    pub fn vault(&self) -> &Vault {
        &self.inner
    }

    /// Run `f` against the vault on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or `Error::Background` if the task panicked
    /// or was cancelled.
    pub async fn run<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Vault) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let vault = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&vault))
            .await
            .map_err(|e| Error::Background(e.to_string()))?
    }

    /// # Errors
    ///
    /// See [`Vault::initialize`].
    pub async fn initialize(&self, password: impl Into<String>) -> Result<InitOutcome> {
        let password = password.into();
        self.run(move |vault| vault.initialize(&password)).await
    }

    /// # Errors
    ///
    /// See [`Vault::delete_database`].
    pub async fn delete_database(&self) -> Result<bool> {
        self.run(Vault::delete_database).await
    }

    /// Combine `base_pdf` with the stored documents `ids` into one PDF.
    ///
    /// When none of the ids resolve to an image or PDF, the base PDF comes
    /// back unchanged and the service is not called.
    ///
    /// # Errors
    ///
    /// Returns storage errors from loading documents, or a `PdfService`
    /// error from the merger.
    pub async fn build_combined_pdf<M: PdfMerger + Sync>(
        &self,
        merger: &M,
        base_pdf: Vec<u8>,
        ids: Vec<i64>,
        token: &str,
    ) -> Result<Vec<u8>> {
        let bundle = self
            .run(move |vault| vault.collect_pdf_bundle(base_pdf, &ids))
            .await?;

        if bundle.is_empty() {
            debug!("No images or PDFs selected; returning base PDF");
            return Ok(bundle.base_pdf);
        }

        merger
            .merge(bundle, token)
            .await
            .map_err(|e| e.during("build", "combined PDF"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use crate::error::ErrorCode;
    use crate::model::{DocumentCategory, DocumentContent, NewDocument};
    use crate::pdf::PdfBundle;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMerger {
        seen: Mutex<Vec<Vec<String>>>,
    }

    impl PdfMerger for RecordingMerger {
        async fn merge(&self, bundle: PdfBundle, token: &str) -> Result<Vec<u8>> {
            if token.is_empty() {
                return Err(Error::PdfService("missing token".to_string()));
            }
            self.seen.lock().unwrap().push(bundle.headers());
            Ok(b"%PDF-merged".to_vec())
        }
    }

    fn shared(dir: &tempfile::TempDir) -> SharedVault {
        SharedVault::new(Vault::new(VaultConfig::new(dir.path().join("v.db"))))
    }

    #[tokio::test]
    async fn test_run_before_init() {
        let dir = tempfile::tempdir().unwrap();
        let vault = shared(&dir);

        let err = vault.run(Vault::list_documents).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Initialization);
    }

    #[tokio::test]
    async fn test_build_combined_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let vault = shared(&dir);
        vault.initialize("pw").await.unwrap();

        let id = vault
            .run(|v| {
                v.add_document(&NewDocument::new(
                    "lease.pdf",
                    DocumentCategory::Listing,
                    DocumentContent::new(b"%PDF-1.4".to_vec(), "application/pdf"),
                ))
            })
            .await
            .unwrap();

        let merger = RecordingMerger::default();
        let merged = vault
            .build_combined_pdf(&merger, b"%PDF-base".to_vec(), vec![id], "token")
            .await
            .unwrap();
        assert_eq!(merged, b"%PDF-merged");
        assert_eq!(merger.seen.lock().unwrap().as_slice(), &[vec!["lease.pdf".to_string()]]);

        let unchanged = vault
            .build_combined_pdf(&merger, b"%PDF-base".to_vec(), vec![999], "token")
            .await
            .unwrap();
        assert_eq!(unchanged, b"%PDF-base");

        let err = vault
            .build_combined_pdf(&merger, b"%PDF-base".to_vec(), vec![id], "")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::PdfService);
    }
}
