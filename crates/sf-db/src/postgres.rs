//! PostgreSQL database backend implementation

use crate::error::{DbError, DbResult};
use crate::ledger::{self, insert_record, record_from_row};
use crate::traits::{DatabaseCore, DatabaseLedger, ScriptOutcome};
use async_trait::async_trait;
use sf_core::migration::duration_millis;
use sf_core::{ConnectionSettings, LedgerAttempt, MigrationRecord};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, Transaction};
use std::time::Instant;
use tokio::sync::Mutex;

/// Application name reported to the server in `pg_stat_activity`
const APPLICATION_NAME: &str = "schemaflow";

/// Build connect options for `database` on the server in `settings`
pub fn connect_options(settings: &ConnectionSettings, database: &str) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(database)
        .application_name(APPLICATION_NAME)
}

/// SQLSTATE `invalid_catalog_name`: the server answered but has no such database
const UNDEFINED_DATABASE: &str = "3D000";

/// Open a single connection to `database`
pub(crate) async fn open(settings: &ConnectionSettings, database: &str) -> DbResult<PgConnection> {
    log::debug!(
        "Connecting to postgres://{}@{}:{}/{}",
        settings.user,
        settings.host,
        settings.port,
        database
    );
    PgConnection::connect_with(&connect_options(settings, database))
        .await
        .map_err(|e| {
            let code = e
                .as_database_error()
                .and_then(|db| db.code())
                .map(|c| c.into_owned());
            connect_failure(settings, database, code.as_deref(), &e.to_string())
        })
}

/// A missing database is reported as [`DbError::DatabaseAbsent`] so callers
/// can decide whether to create it; everything else is a connection error.
fn connect_failure(
    settings: &ConnectionSettings,
    database: &str,
    code: Option<&str>,
    message: &str,
) -> DbError {
    if code == Some(UNDEFINED_DATABASE) {
        return DbError::DatabaseAbsent {
            database: database.to_string(),
            operation: "connect".to_string(),
        };
    }
    DbError::ConnectionError(format!(
        "{}:{}/{}: {}",
        settings.host, settings.port, database, message
    ))
}

/// PostgreSQL database backend
///
/// Holds one session for the whole run; every script gets its own
/// transaction on it.
pub struct PostgresBackend {
    conn: Mutex<PgConnection>,
    database: String,
}

impl PostgresBackend {
    /// Connect to the target database named in `settings`
    pub async fn connect(settings: &ConnectionSettings) -> DbResult<Self> {
        let conn = open(settings, &settings.database).await?;
        Ok(Self {
            conn: Mutex::new(conn),
            database: settings.database.clone(),
        })
    }

    /// Close the session cleanly
    pub async fn close(self) -> DbResult<()> {
        self.conn
            .into_inner()
            .close()
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }
}

async fn begin(conn: &mut PgConnection) -> DbResult<Transaction<'_, Postgres>> {
    conn.begin().await.map_err(|e| DbError::TransactionError {
        action: "begin".to_string(),
        message: e.to_string(),
    })
}

async fn commit(tx: Transaction<'_, Postgres>) -> DbResult<()> {
    tx.commit().await.map_err(|e| DbError::TransactionError {
        action: "commit".to_string(),
        message: e.to_string(),
    })
}

/// Roll back after a failure; the original error is what gets reported
async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        log::warn!("Rollback failed: {}", e);
    }
}

/// Send the script as one simple-protocol message so multi-statement text
/// and dollar-quoted bodies reach the server untouched. Blank scripts are
/// not sent.
async fn execute_script(tx: &mut Transaction<'_, Postgres>, sql: &str) -> DbResult<()> {
    if sql.trim().is_empty() {
        return Ok(());
    }
    sqlx::Executor::execute(&mut **tx, sqlx::raw_sql(sql)).await?;
    Ok(())
}

async fn run_in_transaction(conn: &mut PgConnection, sql: &str) -> DbResult<()> {
    let mut tx = begin(conn).await?;
    if let Err(e) = execute_script(&mut tx, sql).await {
        rollback(tx).await;
        return Err(e);
    }
    commit(tx).await
}

async fn apply_in_transaction(
    conn: &mut PgConnection,
    sql: &str,
    attempt: &LedgerAttempt,
    started: Instant,
) -> DbResult<MigrationRecord> {
    let mut tx = begin(conn).await?;
    if let Err(e) = execute_script(&mut tx, sql).await {
        rollback(tx).await;
        return Err(e);
    }

    let elapsed = duration_millis(started.elapsed());
    let record = match insert_record(&mut tx, attempt, elapsed, true).await {
        Ok(record) => record,
        Err(e) => {
            rollback(tx).await;
            return Err(DbError::LedgerError(format!(
                "recording '{}': {}",
                attempt.script,
                DbError::from(e)
            )));
        }
    };

    commit(tx).await?;
    Ok(record)
}

#[async_trait]
impl DatabaseCore for PostgresBackend {
    async fn run_script(&self, sql: &str) -> ScriptOutcome {
        let mut conn = self.conn.lock().await;
        let started = Instant::now();
        let result = run_in_transaction(&mut conn, sql).await;
        ScriptOutcome {
            duration: started.elapsed(),
            result,
        }
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }

    fn database_name(&self) -> &str {
        &self.database
    }
}

#[async_trait]
impl DatabaseLedger for PostgresBackend {
    async fn ledger_exists(&self) -> DbResult<bool> {
        let mut conn = self.conn.lock().await;
        let sql = ledger::ledger_exists_sql();
        sqlx::query_scalar::<_, bool>(&sql)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| DbError::LedgerError(DbError::from(e).to_string()))
    }

    async fn ensure_ledger(&self) -> DbResult<()> {
        let mut conn = self.conn.lock().await;
        let sql = ledger::create_ledger_sql();
        sqlx::Executor::execute(&mut *conn, sqlx::raw_sql(&sql))
            .await
            .map_err(|e| DbError::LedgerError(DbError::from(e).to_string()))?;
        log::debug!("Ledger table {} ready", ledger::LEDGER_TABLE);
        Ok(())
    }

    async fn load_applied(&self) -> DbResult<Vec<MigrationRecord>> {
        let mut conn = self.conn.lock().await;
        let sql = ledger::select_records_sql();
        let rows = sqlx::query(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| DbError::LedgerError(DbError::from(e).to_string()))?;
        rows.iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::LedgerError(e.to_string()))
    }

    async fn record_attempt(
        &self,
        attempt: &LedgerAttempt,
        execution_time_ms: i32,
        success: bool,
    ) -> DbResult<MigrationRecord> {
        let mut conn = self.conn.lock().await;
        let mut tx = begin(&mut conn).await?;
        let record = match insert_record(&mut tx, attempt, execution_time_ms, success).await {
            Ok(record) => record,
            Err(e) => {
                rollback(tx).await;
                return Err(DbError::LedgerError(format!(
                    "recording '{}': {}",
                    attempt.script,
                    DbError::from(e)
                )));
            }
        };
        commit(tx).await?;
        Ok(record)
    }

    async fn apply_migration(
        &self,
        sql: &str,
        attempt: &LedgerAttempt,
    ) -> ScriptOutcome<MigrationRecord> {
        let mut conn = self.conn.lock().await;
        let started = Instant::now();
        let result = apply_in_transaction(&mut conn, sql, attempt, started).await;
        ScriptOutcome {
            duration: started.elapsed(),
            result,
        }
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
