//! Encrypted SQLite engine.
//!
//! One SQLCipher file per user. The key is applied before any other
//! statement and checked by reading `sqlite_master`; a wrong key never
//! writes to the file. Journaling stays in rollback mode so the store is a
//! single file on disk between transactions.

use crate::error::{Error, Result};
use crate::storage::schema::{apply_schema, incompatible_columns, missing_tables};
use rusqlite::{Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default busy timeout when none is configured.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Suffixes of files SQLite may leave next to the store.
const SIDECAR_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// An open, keyed store.
#[derive(Debug)]
pub struct EncryptedStore {
    conn: Connection,
    path: Option<PathBuf>,
    cipher_version: Option<String>,
}

impl EncryptedStore {
    /// Open (or create) the store at `path` with the given password.
    ///
    /// # Errors
    ///
    /// Returns `Error::Initialization` if the password does not match an
    /// existing file, the file holds tables laid out differently from the
    /// current schema, or the path cannot be created or written.
    pub fn open(path: &Path, password: &str) -> Result<Self> {
        Self::open_with_timeout(path, password, None)
    }

    /// Open with an optional busy timeout.
    ///
    /// A file created by a failed open is removed again; a file that existed
    /// beforehand is left exactly as it was. A tombstone left by an
    /// interrupted [`destroy`] is removed first.
    ///
    /// # Errors
    ///
    /// See [`EncryptedStore::open`].
    pub fn open_with_timeout(
        path: &Path,
        password: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        remove_stale_tombstone(path);
        let existed = path.exists();

        match Self::open_keyed(path, password, timeout.unwrap_or(DEFAULT_BUSY_TIMEOUT), existed) {
            Ok(store) => {
                info!(
                    path = %path.display(),
                    created = !existed,
                    cipher = store.cipher_version.as_deref().unwrap_or("none"),
                    "Opened encrypted store"
                );
                Ok(store)
            }
            Err(err) => {
                if !existed && path.exists() {
                    if let Err(e) = fs::remove_file(path) {
                        warn!(path = %path.display(), error = %e, "Could not remove store created by failed open");
                    }
                }
                Err(err)
            }
        }
    }

    fn open_keyed(path: &Path, password: &str, timeout: Duration, existed: bool) -> Result<Self> {
        let init_err = |reason: String| Error::Initialization {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| init_err(format!("cannot create directory: {e}")))?;
        }
        if path.is_dir() {
            return Err(init_err("path is a directory".to_string()));
        }

        let conn = Connection::open(path).map_err(|e| init_err(e.to_string()))?;

        conn.pragma_update(None, "key", password)
            .map_err(|e| init_err(format!("cannot apply key: {e}")))?;

        // First read after keying fails with "file is not a database" on a wrong key.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|e| {
                debug!(error = %e, "Key verification failed");
                init_err("wrong password or not a Rentvault store".to_string())
            })?;

        let cipher_version = read_cipher_version(&conn);

        configure(&conn, timeout).map_err(|e| init_err(e.to_string()))?;
        // Checked before anything is written so a foreign layout stays untouched.
        check_columns(&conn).map_err(init_err)?;
        apply_schema(&conn).map_err(|e| init_err(format!("cannot apply schema: {e}")))?;
        verify(&conn).map_err(init_err)?;

        if !existed {
            restrict_permissions(path);
        }

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
            cipher_version,
        })
    }

    /// Open an unkeyed in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema fails.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        apply_schema(&conn)?;
        Ok(Self {
            conn,
            path: None,
            cipher_version: None,
        })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// File backing this store; `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// SQLCipher version reported at open time.
    #[must_use]
    pub fn cipher_version(&self) -> Option<&str> {
        self.cipher_version.as_deref()
    }

    /// Run a mutation inside an IMMEDIATE transaction.
    ///
    /// The closure's error rolls everything back, so callers never observe a
    /// partially written row.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an engine error from begin/commit.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let result = f(&tx)?;
        tx.commit()?;

        debug!(op, "Committed");
        Ok(result)
    }
}

fn read_cipher_version(conn: &Connection) -> Option<String> {
    match conn
        .query_row("PRAGMA cipher_version", [], |row| row.get::<_, String>(0))
        .optional()
    {
        Ok(version) => version.filter(|v| !v.is_empty()),
        Err(e) => {
            debug!(error = %e, "cipher_version unavailable");
            None
        }
    }
}

fn configure(conn: &Connection, timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(timeout)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "secure_delete", "ON")?;
    conn.pragma_update(None, "journal_mode", "DELETE")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    Ok(())
}

fn check_columns(conn: &Connection) -> std::result::Result<(), String> {
    let problems = incompatible_columns(conn).map_err(|e| e.to_string())?;
    if problems.is_empty() {
        Ok(())
    } else {
        Err(format!("store layout is not supported: {}", problems.join(", ")))
    }
}

fn verify(conn: &Connection) -> std::result::Result<(), String> {
    let missing = missing_tables(conn).map_err(|e| e.to_string())?;
    if !missing.is_empty() {
        return Err(format!("schema incomplete, missing: {}", missing.join(", ")));
    }
    check_columns(conn)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        warn!(path = %path.display(), error = %e, "Could not restrict store permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

// ==================
// File lifecycle
// ==================

/// Diagnostics about a store file, gathered without opening it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    pub exists: bool,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_file: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Inspect the store file at `path`.
///
/// Never fails: filesystem errors are reported in the `error` field.
#[must_use]
pub fn database_info(path: &Path) -> DatabaseInfo {
    let mut info = DatabaseInfo {
        exists: false,
        path: path.display().to_string(),
        size: None,
        permissions: None,
        readonly: None,
        is_file: None,
        error: None,
    };

    match fs::metadata(path) {
        Ok(meta) => {
            info.exists = true;
            info.size = Some(meta.len());
            info.readonly = Some(meta.permissions().readonly());
            info.is_file = Some(meta.is_file());
            info.permissions = Some(describe_permissions(&meta));
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            info.exists = path.exists();
            info.error = Some(e.to_string());
        }
    }

    info
}

#[cfg(unix)]
fn describe_permissions(meta: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:o}", meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn describe_permissions(meta: &fs::Metadata) -> String {
    if meta.permissions().readonly() {
        "readonly".to_string()
    } else {
        "read-write".to_string()
    }
}

/// Name the store is renamed to while it is being destroyed.
#[must_use]
pub fn tombstone_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".deleting");
    path.with_file_name(name)
}

fn remove_stale_tombstone(path: &Path) {
    let tombstone = tombstone_path(path);
    match fs::remove_file(&tombstone) {
        Ok(()) => info!(path = %tombstone.display(), "Removed stale tombstone"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %tombstone.display(), error = %e, "Could not remove stale tombstone"),
    }
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Delete the store file at `path`.
///
/// The file is first renamed to its tombstone; if that fails the store is
/// untouched and the error is returned. `close` then runs so the caller can
/// drop any open connection before the tombstone and journal sidecars are
/// removed. Once the rename has succeeded the call reports success: a
/// tombstone that cannot be removed is logged and cleared by the next
/// `destroy` or open. Returns `false` when there was no file to delete.
///
/// # Errors
///
/// Returns `Error::Io` if the rename fails.
pub fn destroy(path: &Path, close: impl FnOnce()) -> Result<bool> {
    remove_stale_tombstone(path);
    let tombstone = tombstone_path(path);

    let existed = match fs::rename(path, &tombstone) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(Error::Io(e)),
    };

    close();

    if existed {
        if let Err(e) = fs::remove_file(&tombstone) {
            warn!(path = %tombstone.display(), error = %e, "Could not remove tombstone");
        }
    }
    for suffix in SIDECAR_SUFFIXES {
        for base in [path, tombstone.as_path()] {
            let sidecar = sidecar_path(base, suffix);
            match fs::remove_file(&sidecar) {
                Ok(()) => debug!(path = %sidecar.display(), "Removed sidecar"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %sidecar.display(), error = %e, "Could not remove sidecar"),
            }
        }
    }

    if existed {
        info!(path = %path.display(), "Destroyed store");
    }
    Ok(existed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_open_memory_has_schema() {
        let store = EncryptedStore::open_memory().unwrap();
        assert!(missing_tables(store.conn()).unwrap().is_empty());
        assert!(store.path().is_none());
    }

    #[test]
    fn test_mutate_rolls_back_on_error() {
        let mut store = EncryptedStore::open_memory().unwrap();

        let result: Result<()> = store.mutate("test", |tx| {
            tx.execute(
                "INSERT INTO additional_info (label, value, created_at, updated_at) VALUES ('a', 'b', 1, 1)",
                [],
            )?;
            Err(Error::validation("label", "forced"))
        });
        assert!(result.is_err());

        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM additional_info", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_wrong_password_leaves_file_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.db");

        drop(EncryptedStore::open(&path, "right").unwrap());
        let before = fs::read(&path).unwrap();

        let err = EncryptedStore::open(&path, "wrong").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Initialization);
        assert_eq!(fs::read(&path).unwrap(), before);

        assert!(EncryptedStore::open(&path, "right").is_ok());
    }

    #[test]
    fn test_file_is_encrypted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.db");
        drop(EncryptedStore::open(&path, "secret").unwrap());

        let header = fs::read(&path).unwrap();
        assert!(!header.starts_with(b"SQLite format 3"));
    }

    #[test]
    fn test_database_info_and_destroy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.db");

        assert!(!database_info(&path).exists);

        let store = EncryptedStore::open(&path, "pw").unwrap();
        let info = database_info(&path);
        assert!(info.exists);
        assert_eq!(info.is_file, Some(true));
        assert!(info.size.unwrap() > 0);
        #[cfg(unix)]
        assert_eq!(info.permissions.as_deref(), Some("600"));

        let mut slot = Some(store);
        assert!(destroy(&path, || slot = None).unwrap());
        assert!(slot.is_none());
        assert!(!database_info(&path).exists);
        assert!(!tombstone_path(&path).exists());

        // Already gone.
        assert!(!destroy(&path, || {}).unwrap());
    }

    #[test]
    fn test_stale_tombstone_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.db");
        let tombstone = tombstone_path(&path);

        fs::write(&tombstone, b"left by an interrupted destroy").unwrap();
        assert!(!destroy(&path, || {}).unwrap());
        assert!(!tombstone.exists());

        fs::write(&tombstone, b"left by an interrupted destroy").unwrap();
        let store = EncryptedStore::open(&path, "pw").unwrap();
        assert!(!tombstone.exists());

        fs::write(&tombstone, b"left by an interrupted destroy").unwrap();
        let mut slot = Some(store);
        assert!(destroy(&path, || slot = None).unwrap());
        assert!(!path.exists());
        assert!(!tombstone.exists());
    }

    #[test]
    fn test_rejects_store_with_old_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.db");

        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "key", "pw").unwrap();
        conn.execute_batch(
            "CREATE TABLE listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT NOT NULL,
                contact_email TEXT,
                contact_phone TEXT,
                contact_other TEXT,
                source_link TEXT NOT NULL,
                price_rent DECIMAL(10,2) NOT NULL,
                housing_type TEXT,
                lease_type TEXT CHECK (lease_type IN ('month-to-month', 'annual')),
                upfront_fees DECIMAL(10,2),
                utilities TEXT,
                credit_score_min INTEGER,
                minimum_income DECIMAL(10,2),
                references_required BOOLEAN DEFAULT 0,
                bedrooms INTEGER,
                bathrooms DECIMAL(3,1),
                square_footage INTEGER,
                layout_description TEXT,
                amenities TEXT,
                pet_policy TEXT,
                furnishing TEXT CHECK (furnishing IN ('furnished', 'unfurnished', 'semi-furnished')),
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE profile (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fullname TEXT,
                date_of_birth DATE,
                gender TEXT,
                phone TEXT,
                email TEXT,
                address TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                document_type TEXT NOT NULL CHECK (document_type IN ('ID Card', 'Drivers License', 'Passport', 'Other')),
                reminder_date DATETIME,
                document_references TEXT,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO listings (address, source_link, price_rent) VALUES ('1 A St', 'https://x', 900);
            INSERT INTO profile (fullname) VALUES ('Pat');",
        )
        .unwrap();
        drop(conn);
        let before = fs::read(&path).unwrap();

        let err = EncryptedStore::open(&path, "pw").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Initialization);
        assert!(err.to_string().contains("listings.created_at"));
        assert!(err.to_string().contains("documents.mime_type missing"));
        assert!(err.to_string().contains("profile.monthly_income missing"));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_tombstone_name() {
        assert_eq!(
            tombstone_path(Path::new("/tmp/user_data_a.db")),
            PathBuf::from("/tmp/user_data_a.db.deleting")
        );
    }
}
