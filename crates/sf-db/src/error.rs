//! Error types for sf-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Script or query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Transaction control error (D003)
    #[error("[D003] Transaction {action} failed: {message}")]
    TransactionError { action: String, message: String },

    /// Ledger read/write error (D004)
    #[error("[D004] Ledger operation failed: {0}")]
    LedgerError(String),

    /// Target database cannot be created or checked (D005)
    #[error("[D005] Provisioning database '{database}' failed: {message}")]
    ProvisioningError { database: String, message: String },

    /// Operation attempted against a database that does not exist (D006)
    #[error("[D006] Database '{database}' does not exist; cannot {operation}")]
    DatabaseAbsent { database: String, operation: String },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// True when the server is reachable but the named database is not there
    pub fn is_missing_database(&self) -> bool {
        matches!(self, DbError::DatabaseAbsent { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let mut msg = db_err.message().to_string();
                if let Some(pg) = db_err.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
                    if let Some(detail) = pg.detail() {
                        msg.push_str(&format!("; detail: {}", detail));
                    }
                    if let Some(hint) = pg.hint() {
                        msg.push_str(&format!("; hint: {}", hint));
                    }
                }
                if let Some(code) = db_err.code() {
                    msg.push_str(&format!(" (SQLSTATE {})", code));
                }
                DbError::ExecutionError(msg)
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => DbError::ConnectionError(err.to_string()),
            _ => DbError::ExecutionError(err.to_string()),
        }
    }
}
