//! Database schema definitions.
//!
//! The schema is fixed: six entity tables plus `schema_migrations`, which
//! records the schema version. Every statement is `IF NOT EXISTS`, so
//! applying it to an existing store never alters data. Stores whose tables
//! differ from this schema are reported by [`incompatible_columns`] and
//! refused by the engine.

use rusqlite::{Connection, Result};

/// Current schema version, recorded in `schema_migrations`.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Tables every initialized store must contain.
pub const ENTITY_TABLES: [&str; 6] = [
    "listings",
    "documents",
    "checklists",
    "profile",
    "income_sources",
    "additional_info",
];

/// The complete SQL schema for a Rentvault store.
///
/// Timestamps are INTEGER Unix milliseconds. Booleans are INTEGER 0/1.
/// List-valued columns hold JSON text.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    address TEXT NOT NULL,
    source_link TEXT NOT NULL,
    price_rent REAL NOT NULL CHECK (price_rent >= 0),
    bedrooms INTEGER CHECK (bedrooms IS NULL OR bedrooms >= 0),
    bathrooms REAL CHECK (bathrooms IS NULL OR bathrooms >= 0),
    square_footage INTEGER CHECK (square_footage IS NULL OR square_footage >= 0),
    contact_email TEXT,
    contact_phone TEXT,
    contact_other TEXT,
    housing_type TEXT,
    lease_type TEXT CHECK (lease_type IS NULL OR lease_type IN ('month-to-month', 'annual')),
    upfront_fees REAL CHECK (upfront_fees IS NULL OR upfront_fees >= 0),
    utilities TEXT,
    amenities TEXT,
    credit_score_min INTEGER CHECK (credit_score_min IS NULL OR credit_score_min BETWEEN 300 AND 850),
    minimum_income REAL CHECK (minimum_income IS NULL OR minimum_income >= 0),
    references_required INTEGER NOT NULL DEFAULT 0 CHECK (references_required IN (0, 1)),
    reference_document_ids TEXT NOT NULL DEFAULT '[]',
    layout_description TEXT,
    pet_policy TEXT,
    furnishing TEXT CHECK (furnishing IS NULL OR furnishing IN ('furnished', 'unfurnished', 'semi-furnished')),
    favorite INTEGER NOT NULL DEFAULT 0 CHECK (favorite IN (0, 1)),
    notes TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    document_type TEXT NOT NULL CHECK (document_type IN ('personal', 'listing', 'general', 'other')),
    mime_type TEXT NOT NULL,
    data BLOB NOT NULL,
    reminder_date TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS checklists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_name TEXT NOT NULL,
    is_checked INTEGER NOT NULL DEFAULT 0 CHECK (is_checked IN (0, 1)),
    document_references TEXT NOT NULL DEFAULT '[]',
    reminder_date TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS profile (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    fullname TEXT NOT NULL,
    date_of_birth TEXT,
    gender TEXT,
    phone TEXT,
    email TEXT,
    address TEXT,
    monthly_income REAL CHECK (monthly_income IS NULL OR monthly_income >= 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS income_sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL CHECK (source IN ('employment', 'self-employed', 'other')),
    employer_name TEXT,
    job_title TEXT,
    employment_length TEXT,
    employer_contact TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS additional_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    value TEXT NOT NULL,
    icon TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(document_type);
";

/// Apply the schema and record its version.
///
/// Connection pragmas are the engine's concern and are set before this runs.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}

/// Names of entity tables missing from the store.
///
/// # Errors
///
/// Returns an error if `sqlite_master` cannot be read.
pub fn missing_tables(conn: &Connection) -> Result<Vec<&'static str>> {
    let mut missing = Vec::new();
    for table in ENTITY_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            missing.push(table);
        }
    }
    Ok(missing)
}

/// Declared `(name, type)` of each column, in table order.
///
/// Empty when the table does not exist.
fn table_columns(conn: &Connection, table: &str) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let declared: String = row.get(2)?;
            Ok((name, declared.to_ascii_uppercase()))
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(columns)
}

/// Columns of existing entity tables that do not match [`SCHEMA_SQL`].
///
/// A column is reported when it is absent or declared with another type.
/// Tables that do not exist yet are skipped; [`missing_tables`] covers them.
///
/// # Errors
///
/// Returns an error if a table description cannot be read.
pub fn incompatible_columns(conn: &Connection) -> Result<Vec<String>> {
    let reference = Connection::open_in_memory()?;
    reference.execute_batch(SCHEMA_SQL)?;

    let mut problems = Vec::new();
    for table in ENTITY_TABLES {
        let actual = table_columns(conn, table)?;
        if actual.is_empty() {
            continue;
        }
        for (name, expected) in table_columns(&reference, table)? {
            match actual.iter().find(|(column, _)| *column == name) {
                None => problems.push(format!("{table}.{name} missing")),
                Some((_, found)) if *found != expected => {
                    problems.push(format!("{table}.{name} is {found}, expected {expected}"));
                }
                Some(_) => {}
            }
        }
    }
    Ok(problems)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_schema() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        assert!(missing_tables(&conn).unwrap().is_empty());
        assert!(incompatible_columns(&conn).unwrap().is_empty());

        let version: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations WHERE version = 'v1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_incompatible_columns_reports_old_layout() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                document_type TEXT NOT NULL,
                reminder_date DATETIME,
                document_references TEXT,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .unwrap();

        let problems = incompatible_columns(&conn).unwrap();
        assert!(problems.contains(&"documents.mime_type missing".to_string()));
        assert!(problems.contains(&"documents.data missing".to_string()));
        assert!(problems.contains(&"documents.reminder_date is DATETIME, expected TEXT".to_string()));
        assert!(problems.contains(&"documents.updated_at is DATETIME, expected INTEGER".to_string()));
        // Absent tables are not column problems.
        assert!(!problems.iter().any(|p| p.starts_with("listings.")));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO additional_info (label, value, created_at, updated_at) VALUES ('a', 'b', 1, 1)",
            [],
        )
        .unwrap();
        apply_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM additional_info", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_credit_score_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO listings (address, source_link, price_rent, credit_score_min, created_at, updated_at)
             VALUES ('a', 'b', 100, 900, 1, 1)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_document_requires_bytes() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO documents (name, document_type, mime_type, created_at, updated_at)
             VALUES ('a', 'personal', 'application/pdf', 1, 1)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_is_single_row() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO profile (id, fullname, created_at, updated_at) VALUES (2, 'x', 1, 1)",
            [],
        );
        assert!(result.is_err());
    }
}
