//! sf-core - Core library for Schemaflow
//!
//! This crate provides the resolved configuration record, SQL script
//! discovery, `${NAME}` template rendering, content checksums, the
//! migration data model, and the diff between on-disk scripts and the
//! ledger. Nothing in here talks to a database.

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod error;
pub mod migration;
pub mod plan;
pub mod template;

pub use catalog::{Catalog, FileSource, LocalFileSource, MemoryFileSource, ScriptEntry};
pub use checksum::compute_checksum;
pub use config::{ConfigInputs, ConnectionSettings, DirectorySetting, ResolvedConfig};
pub use error::{CoreError, CoreResult};
pub use migration::{LedgerAttempt, MigrationFile, MigrationRecord};
pub use plan::{LedgerEntry, LedgerEntryState, MigrationPlan};
pub use template::{render, TemplateVariables};
