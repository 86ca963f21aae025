//! Rentvault - encrypted local store for rental hunting.
//!
//! Keeps a renter's listings, documents, application checklist and profile
//! in one SQLCipher file per user, encrypted at rest.
//!
//! # Architecture
//!
//! - [`client`] - The [`Vault`] facade: lifecycle plus CRUD for every entity
//! - [`storage`] - Encrypted engine, schema and repositories
//! - [`model`] - Entity types and partial-update patches
//! - [`validate`] - Input normalization and field checks
//! - [`references`] - Resolving a listing's weak document references
//! - [`files`] - File ingestion and document helpers
//! - [`pdf`] - Combined application PDF via a remote service
//! - [`config`] - Store location and per-user password derivation
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod files;
pub mod model;
pub mod pdf;
pub mod references;
pub mod storage;
pub mod validate;

pub use client::{InitOutcome, SharedVault, Vault};
pub use config::VaultConfig;
pub use error::{Error, ErrorCode, Result};
