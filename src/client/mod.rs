//! Client facade.
//!
//! [`Vault`] is the single surface callers use: store lifecycle
//! (initialize, logout, inspect, delete) plus CRUD for every entity. It owns
//! the lifecycle state explicitly instead of a global flag, and wraps every
//! failure as `Failed to <action> <entity>: <cause>` without losing the
//! cause's [`crate::error::ErrorCode`].

mod shared;

pub use shared::SharedVault;

use crate::config::VaultConfig;
use crate::error::{Error, Result};
use crate::files::read_file_as_blob;
use crate::model::{
    AdditionalInfo, AdditionalInfoPatch, ChecklistPatch, ChecklistTask, Document,
    DocumentCategory, DocumentContent, DocumentPatch, DocumentSummary, IncomeSource,
    IncomeSourcePatch, Listing, ListingPatch, NewAdditionalInfo, NewChecklistTask, NewDocument,
    NewIncomeSource, NewListing, Profile, ProfileFields, ProfilePatch,
};
use crate::pdf::{PdfBundle, collect_pdf_bundle};
use crate::references::hydrate_references;
use crate::storage::{DatabaseInfo, EncryptedStore, database_info, destroy};
use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

const DATABASE: &str = "database";
const LISTING: &str = "listing";
const DOCUMENT: &str = "document";
const TASK: &str = "checklist task";
const PROFILE: &str = "profile";
const INCOME: &str = "income source";
const INFO: &str = "additional info";

/// Result of [`Vault::initialize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cipher_version: Option<String>,
}

enum StoreState {
    Uninitialized,
    Ready {
        store: EncryptedStore,
        key_fingerprint: [u8; 32],
        cipher_version: Option<String>,
    },
}

/// Handle to one user's encrypted store.
pub struct Vault {
    config: VaultConfig,
    state: Mutex<StoreState>,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

fn key_fingerprint(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

impl Vault {
    /// A vault in the uninitialized state. Nothing touches disk until
    /// [`Vault::initialize`].
    #[must_use]
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            state: Mutex::new(StoreState::Uninitialized),
        }
    }

    #[must_use]
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_store<R>(
        &self,
        action: &'static str,
        entity: &'static str,
        f: impl FnOnce(&mut EncryptedStore) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.lock();
        let result = match &mut *state {
            StoreState::Ready { store, .. } => f(store),
            StoreState::Uninitialized => Err(Error::NotInitialized),
        };
        result.map_err(|e| e.during(action, entity))
    }

    // ======================
    // Lifecycle
    // ======================

    /// Open (or create) the store with `password`.
    ///
    /// Calling again with the same password is a no-op returning the cached
    /// outcome. A different password while initialized is refused; log out first.
    ///
    /// # Errors
    ///
    /// Returns an initialization error for an empty or wrong password or an
    /// unwritable path. A failed attempt leaves the state unchanged.
    pub fn initialize(&self, password: &str) -> Result<InitOutcome> {
        let init_err = |reason: &str| {
            Error::Initialization {
                path: self.config.db_path.clone(),
                reason: reason.to_string(),
            }
            .during("initialize", DATABASE)
        };

        if password.is_empty() {
            return Err(init_err("password is empty"));
        }
        let fingerprint = key_fingerprint(password);

        let mut state = self.lock();
        if let StoreState::Ready {
            key_fingerprint,
            cipher_version,
            ..
        } = &*state
        {
            if *key_fingerprint == fingerprint {
                return Ok(InitOutcome {
                    success: true,
                    cipher_version: cipher_version.clone(),
                });
            }
            return Err(init_err(
                "already initialized with a different password; log out first",
            ));
        }

        let store = EncryptedStore::open_with_timeout(
            &self.config.db_path,
            password,
            Some(self.config.busy_timeout),
        )
        .map_err(|e| e.during("initialize", DATABASE))?;

        let cipher_version = store.cipher_version().map(str::to_string);
        *state = StoreState::Ready {
            store,
            key_fingerprint: fingerprint,
            cipher_version: cipher_version.clone(),
        };

        Ok(InitOutcome {
            success: true,
            cipher_version,
        })
    }

    /// Whether the store is open and usable.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(*self.lock(), StoreState::Ready { .. })
    }

    /// Close the store and forget the key. The file stays on disk.
    pub fn handle_logout(&self) {
        let mut state = self.lock();
        if matches!(*state, StoreState::Ready { .. }) {
            info!(path = %self.config.db_path.display(), "Closed store on logout");
        }
        *state = StoreState::Uninitialized;
    }

    /// Diagnostics about the store file. Does not require initialization.
    #[must_use]
    pub fn database_info(&self) -> DatabaseInfo {
        database_info(&self.config.db_path)
    }

    /// Delete the store file and return to the uninitialized state.
    ///
    /// Returns `false` when there was no file. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be moved aside; in that
    /// case the file and the open store are untouched.
    pub fn delete_database(&self) -> Result<bool> {
        let mut state = self.lock();
        destroy(&self.config.db_path, || *state = StoreState::Uninitialized)
            .map_err(|e| e.during("delete", DATABASE))
    }

    // ======================
    // Listings
    // ======================

    /// # Errors
    ///
    /// See [`EncryptedStore::add_listing`].
    pub fn add_listing(&self, listing: &NewListing) -> Result<i64> {
        self.with_store("add", LISTING, |s| s.add_listing(listing))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::get_listing`].
    pub fn get_listing(&self, id: i64) -> Result<Listing> {
        self.with_store("get", LISTING, |s| s.get_listing(id))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::list_listings`].
    pub fn list_listings(&self) -> Result<Vec<Listing>> {
        self.with_store("list", "listings", |s| s.list_listings())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::update_listing`].
    pub fn update_listing(&self, id: i64, patch: ListingPatch) -> Result<()> {
        self.with_store("update", LISTING, |s| s.update_listing(id, patch))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::delete_listing`].
    pub fn delete_listing(&self, id: i64) -> Result<()> {
        self.with_store("delete", LISTING, |s| s.delete_listing(id))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::toggle_listing_favorite`].
    pub fn toggle_listing_favorite(&self, id: i64) -> Result<bool> {
        self.with_store("toggle favorite on", LISTING, |s| s.toggle_listing_favorite(id))
    }

    /// Summaries of the documents a listing references, in reference order.
    /// Deleted documents are omitted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the listing does not exist.
    pub fn listing_documents(&self, id: i64) -> Result<Vec<DocumentSummary>> {
        self.with_store("load documents for", LISTING, |s| {
            let listing = s.get_listing(id)?;
            let summaries = s.list_document_summaries()?;
            Ok(hydrate_references(&listing, &summaries)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    // ======================
    // Documents
    // ======================

    /// # Errors
    ///
    /// See [`EncryptedStore::add_document`].
    pub fn add_document(&self, document: &NewDocument) -> Result<i64> {
        self.with_store("add", DOCUMENT, |s| s.add_document(document))
    }

    /// Read a local file and store it as a document. The file name is used
    /// when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `FileRead` for an unreadable path; nothing is stored then.
    pub fn upload_file(
        &self,
        path: &Path,
        name: Option<&str>,
        category: DocumentCategory,
        reminder: Option<NaiveDate>,
    ) -> Result<i64> {
        let blob = read_file_as_blob(path).map_err(|e| e.during("upload", DOCUMENT))?;
        let name = name.map_or_else(
            || {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            },
            str::to_string,
        );
        let mut document = NewDocument::new(name, category, DocumentContent::from(blob));
        document.reminder_date = reminder;
        self.add_document(&document)
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::get_document`].
    pub fn get_document(&self, id: i64) -> Result<Document> {
        self.with_store("get", DOCUMENT, |s| s.get_document(id))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::list_documents`].
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        self.with_store("list", "documents", |s| s.list_documents())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::list_document_summaries`].
    pub fn list_document_summaries(&self) -> Result<Vec<DocumentSummary>> {
        self.with_store("list", "documents", |s| s.list_document_summaries())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::list_documents_by_category`].
    pub fn list_documents_by_category(&self, category: DocumentCategory) -> Result<Vec<DocumentSummary>> {
        self.with_store("list", "documents", |s| s.list_documents_by_category(category))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::update_document`].
    pub fn update_document(&self, id: i64, patch: DocumentPatch) -> Result<()> {
        self.with_store("update", DOCUMENT, |s| s.update_document(id, patch))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::delete_document`].
    pub fn delete_document(&self, id: i64) -> Result<()> {
        self.with_store("delete", DOCUMENT, |s| s.delete_document(id))
    }

    /// Load the documents to combine with `base_pdf`.
    ///
    /// # Errors
    ///
    /// See [`collect_pdf_bundle`].
    pub fn collect_pdf_bundle(&self, base_pdf: Vec<u8>, ids: &[i64]) -> Result<PdfBundle> {
        self.with_store("collect", "PDF bundle", |s| collect_pdf_bundle(s, base_pdf, ids))
    }

    // ======================
    // Checklist
    // ======================

    /// # Errors
    ///
    /// See [`EncryptedStore::add_task`].
    pub fn add_task(&self, task: &NewChecklistTask) -> Result<i64> {
        self.with_store("add", TASK, |s| s.add_task(task))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::get_task`].
    pub fn get_task(&self, id: i64) -> Result<ChecklistTask> {
        self.with_store("get", TASK, |s| s.get_task(id))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::list_tasks`].
    pub fn list_tasks(&self) -> Result<Vec<ChecklistTask>> {
        self.with_store("list", "checklist tasks", |s| s.list_tasks())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::update_task`].
    pub fn update_task(&self, id: i64, patch: ChecklistPatch) -> Result<()> {
        self.with_store("update", TASK, |s| s.update_task(id, patch))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::delete_task`].
    pub fn delete_task(&self, id: i64) -> Result<()> {
        self.with_store("delete", TASK, |s| s.delete_task(id))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::toggle_task_completion`].
    pub fn toggle_task_completion(&self, id: i64) -> Result<bool> {
        self.with_store("toggle", TASK, |s| s.toggle_task_completion(id))
    }

    // ======================
    // Profile
    // ======================

    /// # Errors
    ///
    /// See [`EncryptedStore::save_profile`].
    pub fn save_profile(&self, fields: &ProfileFields) -> Result<()> {
        self.with_store("save", PROFILE, |s| s.save_profile(fields))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::get_profile`].
    pub fn get_profile(&self) -> Result<Profile> {
        self.with_store("get", PROFILE, |s| s.get_profile())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::update_profile`].
    pub fn update_profile(&self, patch: ProfilePatch) -> Result<()> {
        self.with_store("update", PROFILE, |s| s.update_profile(patch))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::delete_profile`].
    pub fn delete_profile(&self) -> Result<()> {
        self.with_store("delete", PROFILE, |s| s.delete_profile())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::get_monthly_income`].
    pub fn get_monthly_income(&self) -> Result<Option<f64>> {
        self.with_store("get", "monthly income", |s| s.get_monthly_income())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::set_monthly_income`].
    pub fn set_monthly_income(&self, amount: f64) -> Result<()> {
        self.with_store("set", "monthly income", |s| s.set_monthly_income(amount))
    }

    // ======================
    // Income sources
    // ======================

    /// # Errors
    ///
    /// See [`EncryptedStore::add_income_source`].
    pub fn add_income_source(&self, income: &NewIncomeSource) -> Result<i64> {
        self.with_store("add", INCOME, |s| s.add_income_source(income))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::get_income_source`].
    pub fn get_income_source(&self, id: i64) -> Result<IncomeSource> {
        self.with_store("get", INCOME, |s| s.get_income_source(id))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::list_income_sources`].
    pub fn list_income_sources(&self) -> Result<Vec<IncomeSource>> {
        self.with_store("list", "income sources", |s| s.list_income_sources())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::update_income_source`].
    pub fn update_income_source(&self, id: i64, patch: IncomeSourcePatch) -> Result<()> {
        self.with_store("update", INCOME, |s| s.update_income_source(id, patch))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::delete_income_source`].
    pub fn delete_income_source(&self, id: i64) -> Result<()> {
        self.with_store("delete", INCOME, |s| s.delete_income_source(id))
    }

    // ======================
    // Additional info
    // ======================

    /// # Errors
    ///
    /// See [`EncryptedStore::add_additional_info`].
    pub fn add_additional_info(&self, info: &NewAdditionalInfo) -> Result<i64> {
        self.with_store("add", INFO, |s| s.add_additional_info(info))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::set_additional_info`].
    pub fn set_additional_info(&self, id: Option<i64>, info: &NewAdditionalInfo) -> Result<i64> {
        self.with_store("save", INFO, |s| s.set_additional_info(id, info))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::get_additional_info`].
    pub fn get_additional_info(&self, id: i64) -> Result<AdditionalInfo> {
        self.with_store("get", INFO, |s| s.get_additional_info(id))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::list_additional_info`].
    pub fn list_additional_info(&self) -> Result<Vec<AdditionalInfo>> {
        self.with_store("list", INFO, |s| s.list_additional_info())
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::update_additional_info`].
    pub fn update_additional_info(&self, id: i64, patch: AdditionalInfoPatch) -> Result<()> {
        self.with_store("update", INFO, |s| s.update_additional_info(id, patch))
    }

    /// # Errors
    ///
    /// See [`EncryptedStore::delete_additional_info`].
    pub fn delete_additional_info(&self, id: i64) -> Result<()> {
        self.with_store("delete", INFO, |s| s.delete_additional_info(id))
    }
}
