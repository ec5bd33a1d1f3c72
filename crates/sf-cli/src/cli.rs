//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Schemaflow - versioned SQL migrations for PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "sf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands.
///
/// Every connection and directory flag falls back to its environment
/// variable; the flag wins when both are set.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging for schemaflow crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show what would run without changing the database (migrate, seed)
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Database server host
    #[arg(long, env = "DB_HOST", global = true)]
    pub host: Option<String>,

    /// Database server port
    #[arg(long, env = "DB_PORT", global = true)]
    pub port: Option<u16>,

    /// Target database name
    #[arg(long, env = "DB_NAME", global = true)]
    pub database: Option<String>,

    /// Database user, also recorded as `installed_by`
    #[arg(long, env = "DB_USER", global = true)]
    pub user: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Administrative database used to create the target
    #[arg(long, env = "DB_ADMIN_NAME", global = true)]
    pub admin_database: Option<String>,

    /// Directory of versioned migration scripts
    #[arg(long, env = "MIGRATIONS_DIR", global = true)]
    pub migrations_dir: Option<PathBuf>,

    /// Directory of scripts run after every migration pass
    #[arg(long, env = "AFTER_MIGRATE_DIR", global = true)]
    pub after_migrate_dir: Option<PathBuf>,

    /// Directory of seed data scripts
    #[arg(long, env = "SEEDS_DIR", global = true)]
    pub seeds_dir: Option<PathBuf>,

    /// Template variable override, e.g. --var SCHEMA=app (repeatable)
    #[arg(
        long = "var",
        value_name = "KEY=VALUE",
        global = true,
        value_parser = sf_core::config::parse_variable
    )]
    pub vars: Vec<(String, String)>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations, then the afterMigrate scripts
    Migrate(MigrateArgs),

    /// Load seed data scripts (not tracked)
    Seed(SeedArgs),

    /// Show applied and pending migrations
    Info(InfoArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {}

/// Arguments for the seed command
#[derive(Args, Debug)]
pub struct SeedArgs {}

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: InfoOutput,
}

/// Info output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoOutput {
    /// Human-readable listing
    Table,
    /// JSON report
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
