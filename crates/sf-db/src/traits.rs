//! Database trait definitions
//!
//! `DatabaseCore` is the transaction runner and `DatabaseLedger` the
//! migration ledger; the orchestrator only ever sees `dyn Database`.

use crate::error::DbResult;
use async_trait::async_trait;
use sf_core::migration::duration_millis;
use sf_core::{LedgerAttempt, MigrationRecord};
use std::time::Duration;

/// Outcome of one script run in its own transaction.
///
/// The elapsed time is reported whether the transaction committed or was
/// rolled back.
#[derive(Debug)]
pub struct ScriptOutcome<T = ()> {
    pub duration: Duration,
    pub result: DbResult<T>,
}

impl<T> ScriptOutcome<T> {
    /// Elapsed time in ledger milliseconds
    pub fn duration_ms(&self) -> i32 {
        duration_millis(self.duration)
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Transactional script execution
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Execute the full `sql` text as one transaction.
    ///
    /// On any statement error the transaction is rolled back and the error
    /// returned; on success the commit has completed before this returns.
    async fn run_script(&self, sql: &str) -> ScriptOutcome;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Name of the connected database
    fn database_name(&self) -> &str;
}

/// The persistent record of applied migrations
#[async_trait]
pub trait DatabaseLedger: Send + Sync {
    /// Whether the ledger relation exists yet
    async fn ledger_exists(&self) -> DbResult<bool>;

    /// Create the ledger relation if absent (idempotent)
    async fn ensure_ledger(&self) -> DbResult<()>;

    /// All committed ledger rows, in `installed_rank` order
    async fn load_applied(&self) -> DbResult<Vec<MigrationRecord>>;

    /// Append one row in its own committed transaction
    async fn record_attempt(
        &self,
        attempt: &LedgerAttempt,
        execution_time_ms: i32,
        success: bool,
    ) -> DbResult<MigrationRecord>;

    /// Execute a migration and append its `success = true` row in the same
    /// transaction, so the row exists only if the migration committed.
    async fn apply_migration(
        &self,
        sql: &str,
        attempt: &LedgerAttempt,
    ) -> ScriptOutcome<MigrationRecord>;
}

/// Everything the orchestrator needs from a target database
pub trait Database: DatabaseCore + DatabaseLedger {}

impl<T: DatabaseCore + DatabaseLedger> Database for T {}
