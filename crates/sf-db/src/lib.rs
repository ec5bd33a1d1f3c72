//! sf-db - Database layer for Schemaflow
//!
//! This crate provides the `Database` traits (transactional script
//! execution and the migration ledger), the PostgreSQL backend, database
//! provisioning, and a stand-in for targets that do not exist yet.

pub mod absent;
pub mod error;
pub mod ledger;
pub mod postgres;
pub mod provision;
pub mod traits;

pub use absent::AbsentDatabase;
pub use error::{DbError, DbResult};
pub use postgres::PostgresBackend;
pub use provision::ensure_database_exists;
pub use traits::{Database, DatabaseCore, DatabaseLedger, ScriptOutcome};
