//! Target database provisioning through the admin database

use crate::error::{DbError, DbResult};
use crate::ledger::quote_ident;
use crate::postgres::open;
use sf_core::ConnectionSettings;
use sqlx::postgres::PgConnection;
use sqlx::Connection;

const DATABASE_EXISTS_SQL: &str = "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)";

/// Build the `CREATE DATABASE` statement for `name`
pub fn create_database_sql(name: &str) -> String {
    format!("CREATE DATABASE {}", quote_ident(name))
}

async fn exists_on(admin: &mut PgConnection, name: &str) -> DbResult<bool> {
    sqlx::query_scalar::<_, bool>(DATABASE_EXISTS_SQL)
        .bind(name)
        .fetch_one(admin)
        .await
        .map_err(DbError::from)
}

async fn close_admin(admin: PgConnection) {
    if let Err(e) = admin.close().await {
        log::debug!("Closing admin connection: {}", e);
    }
}

fn provisioning_error(settings: &ConnectionSettings, err: DbError) -> DbError {
    match err {
        DbError::ConnectionError(_) => err,
        other => DbError::ProvisioningError {
            database: settings.database.clone(),
            message: other.to_string(),
        },
    }
}

/// Create the target database through the admin database if it does not
/// exist.
///
/// Returns `true` when this call created it.
pub async fn ensure_database_exists(settings: &ConnectionSettings) -> DbResult<bool> {
    let mut admin = open(settings, &settings.admin_database).await?;
    let result = create_if_missing(&mut admin, &settings.database).await;
    close_admin(admin).await;
    result.map_err(|e| provisioning_error(settings, e))
}

async fn create_if_missing(admin: &mut PgConnection, name: &str) -> DbResult<bool> {
    if exists_on(admin, name).await? {
        log::debug!("Database {} already exists", name);
        return Ok(false);
    }

    log::info!("Creating database {}", name);
    // CREATE DATABASE cannot run inside a transaction block
    sqlx::Executor::execute(&mut *admin, sqlx::raw_sql(&create_database_sql(name))).await?;
    Ok(true)
}

#[cfg(test)]
#[path = "provision_test.rs"]
mod tests;
