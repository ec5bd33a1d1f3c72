use super::*;
use crate::cli::Cli;
use clap::Parser;
use serial_test::serial;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
#[serial]
fn test_resolve_config_from_flags() {
    let cli = parse(&[
        "sf",
        "migrate",
        "--database",
        "app",
        "--user",
        "deployer",
        "--password",
        "secret",
        "--migrations-dir",
        "db/migrations",
        "--var",
        "SCHEMA=app",
    ]);
    let env = HashMap::from([
        ("SCHEMA".to_string(), "public".to_string()),
        ("HOME".to_string(), "/home/deployer".to_string()),
    ]);

    let config = resolve_config(&cli.global, env).unwrap();

    assert_eq!(config.connection.database, "app");
    assert_eq!(config.installed_by(), "deployer");
    assert!(config.migrations_dir.explicit);
    assert!(!config.seeds_dir.explicit);
    assert_eq!(config.variables.get("SCHEMA").unwrap(), "app");
    assert_eq!(config.variables.get("HOME").unwrap(), "/home/deployer");
}

#[test]
#[serial]
fn test_missing_database_is_reported() {
    let cli = parse(&["sf", "info", "--user", "u", "--password", "p"]);
    let cli_global = GlobalArgs {
        database: None,
        ..cli.global
    };

    let err = resolve_config(&cli_global, HashMap::new()).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("--database"));
    assert!(msg.contains("DB_NAME"));
}

#[test]
#[serial]
fn test_connection_debug_hides_password() {
    let cli = parse(&[
        "sf",
        "info",
        "--database",
        "app",
        "--user",
        "u",
        "--password",
        "hunter2",
    ]);
    let config = resolve_config(&cli.global, HashMap::new()).unwrap();
    assert_eq!(config.connection.password, "hunter2");
    assert!(!format!("{:?}", config.connection).contains("hunter2"));
}
