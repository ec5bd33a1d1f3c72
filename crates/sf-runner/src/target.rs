//! Opening the target database for a command
//!
//! Every command connects to the target directly. Only when the server
//! reports it missing does `migrate` create it through the administrative
//! database; read-only invocations fall back to [`AbsentDatabase`] and
//! `seed` fails.

use crate::error::{RunnerError, RunnerResult};
use sf_core::ConnectionSettings;
use sf_db::{ensure_database_exists, AbsentDatabase, Database, DbError, PostgresBackend};

/// What the invoked command is allowed to do to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// `info` and dry runs: never create anything
    ReadOnly,
    /// `migrate`: create the database if it is missing
    Migrate,
    /// `seed`: the database must already exist
    Seed,
}

/// The database a command runs against
pub enum Target {
    Postgres(PostgresBackend),
    Absent(AbsentDatabase),
}

impl Target {
    pub fn database(&self) -> &dyn Database {
        match self {
            Target::Postgres(db) => db,
            Target::Absent(db) => db,
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self, Target::Postgres(_))
    }

    pub async fn close(self) {
        if let Target::Postgres(db) = self {
            if let Err(e) = db.close().await {
                log::debug!("Closing connection: {}", e);
            }
        }
    }
}

/// An open target plus whether this invocation created it
pub struct OpenedTarget {
    pub target: Target,
    pub created: bool,
}

fn provisioning(settings: &ConnectionSettings, source: DbError) -> RunnerError {
    RunnerError::Provisioning {
        database: settings.database.clone(),
        source,
    }
}

/// Connect to the target database, creating it first when `access` allows.
///
/// The target is always tried directly; the admin database is only used
/// once the server reports the target missing.
pub async fn open_target(
    settings: &ConnectionSettings,
    access: Access,
) -> RunnerResult<OpenedTarget> {
    match PostgresBackend::connect(settings).await {
        Ok(backend) => Ok(connected(settings, backend, false)),
        Err(e) if e.is_missing_database() => match missing_target(settings, access)? {
            Some(opened) => Ok(opened),
            None => create_and_connect(settings).await,
        },
        Err(e) => Err(provisioning(settings, e)),
    }
}

/// What a command gets when its database does not exist; `None` means
/// create it
fn missing_target(
    settings: &ConnectionSettings,
    access: Access,
) -> RunnerResult<Option<OpenedTarget>> {
    match access {
        Access::Migrate => Ok(None),
        Access::Seed => Err(provisioning(
            settings,
            DbError::DatabaseAbsent {
                database: settings.database.clone(),
                operation: "load seeds (run migrate first)".to_string(),
            },
        )),
        Access::ReadOnly => {
            log::info!(
                "Database {} does not exist; reading it as empty",
                settings.database
            );
            Ok(Some(OpenedTarget {
                target: Target::Absent(AbsentDatabase::new(settings.database.clone())),
                created: false,
            }))
        }
    }
}

async fn create_and_connect(settings: &ConnectionSettings) -> RunnerResult<OpenedTarget> {
    let created = ensure_database_exists(settings)
        .await
        .map_err(|e| provisioning(settings, e))?;
    if created {
        log::info!("Created database {}", settings.database);
    }
    let backend = PostgresBackend::connect(settings)
        .await
        .map_err(|e| provisioning(settings, e))?;
    Ok(connected(settings, backend, created))
}

fn connected(
    settings: &ConnectionSettings,
    backend: PostgresBackend,
    created: bool,
) -> OpenedTarget {
    log::debug!(
        "Connected to {}:{}/{}",
        settings.host,
        settings.port,
        settings.database
    );
    OpenedTarget {
        target: Target::Postgres(backend),
        created,
    }
}

#[cfg(test)]
#[path = "target_test.rs"]
mod tests;
