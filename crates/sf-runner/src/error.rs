//! Error types for sf-runner

use sf_core::CoreError;
use sf_db::DbError;
use thiserror::Error;

/// Fatal outcomes of a command. AfterMigrate failures never appear here;
/// they are reported as data.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// R001: Target database cannot be reached or created
    #[error("[R001] Cannot provision database '{database}': {source}")]
    Provisioning {
        database: String,
        #[source]
        source: DbError,
    },

    /// R002: An applied migration was edited after it was recorded
    #[error(
        "[R002] Checksum mismatch for applied migration '{script}': recorded {recorded}, \
         found {current}. Migration files must not be modified after being applied"
    )]
    ChecksumMismatch {
        script: String,
        recorded: String,
        current: String,
    },

    /// R003: A pending migration failed and was rolled back
    #[error("[R003] Migration '{script}' failed: {message}")]
    MigrationExecution { script: String, message: String },

    /// R004: A migration failed and its failure could not be recorded
    #[error(
        "[R004] Migration '{script}' failed ({migration_error}) and the failure could NOT be \
         recorded in the ledger: {ledger_error}"
    )]
    LedgerWrite {
        script: String,
        migration_error: String,
        ledger_error: String,
    },

    /// R005: A seed script failed; remaining seeds were skipped
    #[error("[R005] Seed '{script}' failed: {message}")]
    SeedExecution { script: String, message: String },

    /// R006: Stopped between files by an interrupt
    #[error("[R006] Interrupted; stopped before {remaining} remaining file(s)")]
    Interrupted { remaining: usize },

    /// R007: Core error
    #[error("{0}")]
    Core(CoreError),

    /// R008: Database error
    #[error("{0}")]
    Db(#[from] DbError),
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;

impl From<CoreError> for RunnerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ChecksumMismatch {
                script,
                recorded,
                current,
            } => RunnerError::ChecksumMismatch {
                script,
                recorded,
                current,
            },
            other => RunnerError::Core(other),
        }
    }
}
