use super::*;
use clap::CommandFactory;
use serial_test::serial;

const CONNECTION_VARS: &[&str] = &[
    "DB_HOST",
    "DB_PORT",
    "DB_NAME",
    "DB_USER",
    "DB_PASSWORD",
    "DB_ADMIN_NAME",
    "MIGRATIONS_DIR",
    "AFTER_MIGRATE_DIR",
    "SEEDS_DIR",
];

fn clear_env() {
    for var in CONNECTION_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
#[serial]
fn test_flags_after_subcommand() {
    clear_env();
    let cli = Cli::try_parse_from([
        "sf",
        "migrate",
        "--dry-run",
        "--host",
        "db.internal",
        "--port",
        "6543",
    ])
    .unwrap();

    assert!(matches!(cli.command, Commands::Migrate(_)));
    assert!(cli.global.dry_run);
    assert_eq!(cli.global.host.as_deref(), Some("db.internal"));
    assert_eq!(cli.global.port, Some(6543));
    assert!(cli.global.database.is_none());
}

#[test]
#[serial]
fn test_env_fallback_and_flag_precedence() {
    clear_env();
    std::env::set_var("DB_HOST", "env-host");
    std::env::set_var("DB_NAME", "env_db");
    std::env::set_var("SEEDS_DIR", "fixtures/seeds");

    let cli = Cli::try_parse_from(["sf", "seed", "--database", "flag_db"]).unwrap();
    clear_env();

    assert_eq!(cli.global.host.as_deref(), Some("env-host"));
    assert_eq!(cli.global.database.as_deref(), Some("flag_db"));
    assert_eq!(
        cli.global.seeds_dir.as_deref(),
        Some(std::path::Path::new("fixtures/seeds"))
    );
}

#[test]
#[serial]
fn test_invalid_port_env_is_rejected() {
    clear_env();
    std::env::set_var("DB_PORT", "not-a-port");
    let result = Cli::try_parse_from(["sf", "info"]);
    clear_env();
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_repeated_vars() {
    clear_env();
    let cli = Cli::try_parse_from([
        "sf",
        "migrate",
        "--var",
        "SCHEMA=app",
        "--var",
        "OWNER=",
    ])
    .unwrap();

    assert_eq!(
        cli.global.vars,
        vec![
            ("SCHEMA".to_string(), "app".to_string()),
            ("OWNER".to_string(), String::new()),
        ]
    );
}

#[test]
#[serial]
fn test_malformed_var_is_rejected() {
    clear_env();
    assert!(Cli::try_parse_from(["sf", "migrate", "--var", "NOEQUALS"]).is_err());
    assert!(Cli::try_parse_from(["sf", "migrate", "--var", "1BAD=x"]).is_err());
}

#[test]
#[serial]
fn test_info_output_format() {
    clear_env();
    let cli = Cli::try_parse_from(["sf", "info", "--output", "json"]).unwrap();
    match cli.command {
        Commands::Info(args) => assert_eq!(args.output, InfoOutput::Json),
        other => panic!("expected info, got {:?}", other),
    }

    let cli = Cli::try_parse_from(["sf", "info"]).unwrap();
    match cli.command {
        Commands::Info(args) => assert_eq!(args.output, InfoOutput::Table),
        other => panic!("expected info, got {:?}", other),
    }
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["sf", "rollback"]).is_err());
}
