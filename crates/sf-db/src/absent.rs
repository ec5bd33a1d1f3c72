//! Stand-in backend for a target database that does not exist yet
//!
//! Read-only commands (`info`, dry runs) must not create the database, so
//! they run against this instead: the ledger reads as empty and anything
//! that would write is refused.

use crate::error::{DbError, DbResult};
use crate::traits::{DatabaseCore, DatabaseLedger, ScriptOutcome};
use async_trait::async_trait;
use sf_core::{LedgerAttempt, MigrationRecord};
use std::time::Duration;

/// Backend for a database that is known to be missing
pub struct AbsentDatabase {
    database: String,
}

impl AbsentDatabase {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }

    fn refuse(&self, operation: &str) -> DbError {
        DbError::DatabaseAbsent {
            database: self.database.clone(),
            operation: operation.to_string(),
        }
    }
}

#[async_trait]
impl DatabaseCore for AbsentDatabase {
    async fn run_script(&self, _sql: &str) -> ScriptOutcome {
        ScriptOutcome {
            duration: Duration::ZERO,
            result: Err(self.refuse("run scripts")),
        }
    }

    fn db_type(&self) -> &'static str {
        "absent"
    }

    fn database_name(&self) -> &str {
        &self.database
    }
}

#[async_trait]
impl DatabaseLedger for AbsentDatabase {
    async fn ledger_exists(&self) -> DbResult<bool> {
        Ok(false)
    }

    async fn ensure_ledger(&self) -> DbResult<()> {
        Err(self.refuse("create the ledger"))
    }

    async fn load_applied(&self) -> DbResult<Vec<MigrationRecord>> {
        Ok(Vec::new())
    }

    async fn record_attempt(
        &self,
        _attempt: &LedgerAttempt,
        _execution_time_ms: i32,
        _success: bool,
    ) -> DbResult<MigrationRecord> {
        Err(self.refuse("record migrations"))
    }

    async fn apply_migration(
        &self,
        _sql: &str,
        _attempt: &LedgerAttempt,
    ) -> ScriptOutcome<MigrationRecord> {
        ScriptOutcome {
            duration: Duration::ZERO,
            result: Err(self.refuse("apply migrations")),
        }
    }
}

#[cfg(test)]
#[path = "absent_test.rs"]
mod tests;
