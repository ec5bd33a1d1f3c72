//! Runtime context for CLI commands: logging and the resolved configuration

use anyhow::{Context, Result};
use sf_core::{ConfigInputs, ResolvedConfig};
use std::collections::HashMap;

use crate::cli::GlobalArgs;

/// Crates raised to `debug` by `--verbose`
const VERBOSE_FILTER: &str = "warn,sf_cli=debug,sf_core=debug,sf_db=debug,sf_runner=debug";

/// Initialise `env_logger`; `RUST_LOG` overrides the default filter
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { VERBOSE_FILTER } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Build the configuration record from parsed arguments and `environment`.
///
/// `environment` is also the template variable set, overlaid by `--var`.
pub fn resolve_config(
    args: &GlobalArgs,
    environment: HashMap<String, String>,
) -> Result<ResolvedConfig> {
    let config = ResolvedConfig::resolve(ConfigInputs {
        host: args.host.clone(),
        port: args.port,
        database: args.database.clone(),
        user: args.user.clone(),
        password: args.password.clone(),
        admin_database: args.admin_database.clone(),
        migrations_dir: args.migrations_dir.clone(),
        after_migrate_dir: args.after_migrate_dir.clone(),
        seeds_dir: args.seeds_dir.clone(),
        environment,
        overrides: args.vars.clone(),
    })
    .context("Failed to resolve configuration")?;

    log::debug!(
        "Resolved connection {:?}; migrations {}, afterMigrate {}, seeds {}; {} template variable(s)",
        config.connection,
        config.migrations_dir,
        config.after_migrate_dir,
        config.seeds_dir,
        config.variables.len()
    );
    Ok(config)
}

/// Resolve against the current process environment; entries that are not
/// valid UTF-8 cannot be template variables and are skipped
pub fn load_config(args: &GlobalArgs) -> Result<ResolvedConfig> {
    let environment = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();
    resolve_config(args, environment)
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
