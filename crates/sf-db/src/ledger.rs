//! SQL text and row mapping for the `schema_migrations` ledger

use chrono::NaiveDateTime;
use sf_core::checksum::CHECKSUM_LEN;
use sf_core::{LedgerAttempt, MigrationRecord};
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::Row;

/// Name of the ledger relation in the target database's search path
pub const LEDGER_TABLE: &str = "schema_migrations";

/// Quote an identifier for PostgreSQL, doubling embedded double quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// DDL creating the ledger if it is not there yet
pub fn create_ledger_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n\
         \x20   installed_rank SERIAL PRIMARY KEY,\n\
         \x20   script VARCHAR(1000) NOT NULL UNIQUE,\n\
         \x20   description VARCHAR(200) NOT NULL,\n\
         \x20   checksum VARCHAR({}) NOT NULL,\n\
         \x20   installed_by VARCHAR(100) NOT NULL,\n\
         \x20   installed_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,\n\
         \x20   execution_time INTEGER NOT NULL,\n\
         \x20   success BOOLEAN NOT NULL\n\
         )",
        LEDGER_TABLE, CHECKSUM_LEN
    )
}

/// Existence probe; `to_regclass` resolves through the search path
pub fn ledger_exists_sql() -> String {
    format!("SELECT to_regclass('{}') IS NOT NULL", LEDGER_TABLE)
}

pub fn select_records_sql() -> String {
    format!(
        "SELECT installed_rank, script, description, checksum, installed_by, \
         installed_on, execution_time, success FROM {} ORDER BY installed_rank",
        LEDGER_TABLE
    )
}

pub fn insert_record_sql() -> String {
    format!(
        "INSERT INTO {} (script, description, checksum, installed_by, execution_time, success) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING installed_rank, installed_on",
        LEDGER_TABLE
    )
}

/// Removes an earlier failed attempt so a retry can take the script name
pub fn supersede_failed_sql() -> String {
    format!(
        "DELETE FROM {} WHERE script = $1 AND success = false",
        LEDGER_TABLE
    )
}

/// Map a full ledger row. NULLs, possible in ledgers created by other
/// tools, read as empty values.
pub(crate) fn record_from_row(row: &PgRow) -> Result<MigrationRecord, sqlx::Error> {
    Ok(MigrationRecord {
        installed_rank: row.try_get("installed_rank")?,
        script: row.try_get("script")?,
        description: row
            .try_get::<Option<String>, _>("description")?
            .unwrap_or_default(),
        checksum: row
            .try_get::<Option<String>, _>("checksum")?
            .unwrap_or_default(),
        installed_by: row
            .try_get::<Option<String>, _>("installed_by")?
            .unwrap_or_default(),
        installed_on: row
            .try_get::<Option<NaiveDateTime>, _>("installed_on")?
            .unwrap_or_default(),
        execution_time_ms: row
            .try_get::<Option<i32>, _>("execution_time")?
            .unwrap_or_default(),
        success: row.try_get::<Option<bool>, _>("success")?.unwrap_or(false),
    })
}

/// Append one ledger row on `conn`, replacing any failed attempt for the
/// same script. Callers run this inside a transaction.
pub(crate) async fn insert_record(
    conn: &mut PgConnection,
    attempt: &LedgerAttempt,
    execution_time_ms: i32,
    success: bool,
) -> Result<MigrationRecord, sqlx::Error> {
    let superseded = sqlx::query(&supersede_failed_sql())
        .bind(&attempt.script)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if superseded > 0 {
        log::debug!("Superseded failed ledger entry for {}", attempt.script);
    }

    let sql = insert_record_sql();
    let row = sqlx::query(&sql)
        .bind(&attempt.script)
        .bind(&attempt.description)
        .bind(&attempt.checksum)
        .bind(&attempt.installed_by)
        .bind(execution_time_ms)
        .bind(success)
        .fetch_one(&mut *conn)
        .await?;

    Ok(MigrationRecord {
        installed_rank: row.try_get("installed_rank")?,
        script: attempt.script.clone(),
        description: attempt.description.clone(),
        checksum: attempt.checksum.clone(),
        installed_by: attempt.installed_by.clone(),
        installed_on: row
            .try_get::<Option<NaiveDateTime>, _>("installed_on")?
            .unwrap_or_default(),
        execution_time_ms,
        success,
    })
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
