//! Resolved configuration record.
//!
//! Configuration arrives from any source (CLI flags, environment, tests)
//! as a [`ConfigInputs`] and is validated once into an immutable
//! [`ResolvedConfig`], which is then passed by reference to every component.

use crate::error::{CoreError, CoreResult};
use crate::template::TemplateVariables;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default database host
pub const DEFAULT_HOST: &str = "localhost";

/// Default PostgreSQL port
pub const DEFAULT_PORT: u16 = 5432;

/// Database used for the administrative (provisioning) connection
pub const DEFAULT_ADMIN_DATABASE: &str = "postgres";

/// Default migrations directory
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Default afterMigrate directory
pub const DEFAULT_AFTER_MIGRATE_DIR: &str = "afterMigrate";

/// Default seeds directory
pub const DEFAULT_SEEDS_DIR: &str = "seeds";

/// A script directory and whether the user configured it explicitly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySetting {
    /// Directory path
    pub path: PathBuf,

    /// True when set by flag or environment rather than defaulted
    pub explicit: bool,
}

impl DirectorySetting {
    /// A directory the user asked for
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            explicit: true,
        }
    }

    /// A directory that fell back to its default
    pub fn defaulted(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            explicit: false,
        }
    }

    fn from_option(path: Option<PathBuf>, default: &str) -> Self {
        match path {
            Some(p) => Self::explicit(p),
            None => Self::defaulted(default),
        }
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for DirectorySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Database connection settings
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(skip)]
    pub password: String,
    /// Database the administrative connection uses to create `database`
    pub admin_database: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("admin_database", &self.admin_database)
            .finish()
    }
}

/// Unvalidated configuration values, typically straight from CLI/env parsing
#[derive(Debug, Clone, Default)]
pub struct ConfigInputs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub admin_database: Option<String>,
    pub migrations_dir: Option<PathBuf>,
    pub after_migrate_dir: Option<PathBuf>,
    pub seeds_dir: Option<PathBuf>,
    /// Base template variables (normally the whole process environment)
    pub environment: HashMap<String, String>,
    /// Explicit `KEY=VALUE` overrides, applied after `environment`
    pub overrides: Vec<(String, String)>,
}

/// Validated, immutable configuration for one invocation
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub connection: ConnectionSettings,
    pub migrations_dir: DirectorySetting,
    pub after_migrate_dir: DirectorySetting,
    pub seeds_dir: DirectorySetting,
    pub variables: TemplateVariables,
}

impl ResolvedConfig {
    /// Validate `inputs` and build the configuration record
    pub fn resolve(inputs: ConfigInputs) -> CoreResult<Self> {
        let database = required(inputs.database, "database name", "--database", "DB_NAME")?;
        let user = required(inputs.user, "database user", "--user", "DB_USER")?;
        let password = required(
            inputs.password,
            "database password",
            "--password",
            "DB_PASSWORD",
        )?;

        let port = inputs.port.unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "port must be between 1 and 65535".to_string(),
            });
        }

        let connection = ConnectionSettings {
            host: non_blank(inputs.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database,
            user,
            password,
            admin_database: non_blank(inputs.admin_database)
                .unwrap_or_else(|| DEFAULT_ADMIN_DATABASE.to_string()),
        };

        let mut variables = inputs.environment;
        for (key, value) in inputs.overrides {
            variables.insert(key, value);
        }

        Ok(Self {
            connection,
            migrations_dir: DirectorySetting::from_option(
                inputs.migrations_dir,
                DEFAULT_MIGRATIONS_DIR,
            ),
            after_migrate_dir: DirectorySetting::from_option(
                inputs.after_migrate_dir,
                DEFAULT_AFTER_MIGRATE_DIR,
            ),
            seeds_dir: DirectorySetting::from_option(inputs.seeds_dir, DEFAULT_SEEDS_DIR),
            variables,
        })
    }

    /// Identity recorded as `installed_by` in the ledger
    pub fn installed_by(&self) -> &str {
        &self.connection.user
    }
}

/// Parse a `KEY=VALUE` template variable override.
///
/// The key must be a valid template name (`[A-Za-z_][A-Za-z0-9_]*`); the
/// value is everything after the first `=` and may be empty.
pub fn parse_variable(raw: &str) -> CoreResult<(String, String)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| CoreError::InvalidVariable {
        raw: raw.to_string(),
    })?;

    let mut chars = key.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CoreError::InvalidVariable {
            raw: raw.to_string(),
        });
    }

    Ok((key.to_string(), value.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, what: &str, flag: &str, env: &str) -> CoreResult<String> {
    non_blank(value).ok_or_else(|| CoreError::ConfigInvalid {
        message: format!("{} is required (use {} or {})", what, flag, env),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
