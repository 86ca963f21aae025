//! Encrypted storage layer for Rentvault.
//!
//! This module provides the persistence layer using SQLCipher with:
//! - A password-keyed single file per user
//! - Transaction discipline for atomic writes
//! - A fixed, versioned schema checked on every open
//!
//! # Submodules
//!
//! - [`engine`] - Keyed connection, mutation helper, file lifecycle
//! - [`schema`] - Database schema definitions and layout checks
//! - [`listings`], [`documents`], [`checklists`], [`profile`] - Entity repositories

mod codec;
pub mod engine;
pub mod schema;
mod update;

pub mod checklists;
pub mod documents;
pub mod listings;
pub mod profile;

pub use engine::{DEFAULT_BUSY_TIMEOUT, DatabaseInfo, EncryptedStore, database_info, destroy};
