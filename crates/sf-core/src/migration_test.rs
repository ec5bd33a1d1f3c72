use super::*;
use crate::catalog::MemoryFileSource;
use crate::config::DirectorySetting;

#[test]
fn test_describe_from_filename() {
    assert_eq!(
        describe("v0.1.0_initial_schema.sql"),
        "v0.1.0 initial schema"
    );
    assert_eq!(describe("no_extension"), "no extension");
}

#[test]
fn test_describe_truncates_to_column_width() {
    let long = format!("{}.sql", "a".repeat(300));
    assert_eq!(describe(&long).chars().count(), DESCRIPTION_MAX_LEN);
}

#[test]
fn test_checksum_covers_raw_not_rendered_content() {
    let file = MigrationFile::new(
        "v1_roles.sql",
        "migrations/v1_roles.sql",
        b"CREATE ROLE ${APP_ROLE};".to_vec(),
    );

    let mut vars = TemplateVariables::new();
    vars.insert("APP_ROLE".to_string(), "reader".to_string());
    let rendered_a = file.render(&vars).unwrap();
    vars.insert("APP_ROLE".to_string(), "writer".to_string());
    let rendered_b = file.render(&vars).unwrap();

    assert_ne!(rendered_a, rendered_b);
    assert_eq!(file.checksum, compute_checksum(b"CREATE ROLE ${APP_ROLE};"));
}

#[test]
fn test_render_keeps_unresolved_placeholders() {
    let file = MigrationFile::new(
        "v1_grants.sql",
        "m/v1_grants.sql",
        b"GRANT SELECT ON t TO ${APP_ROLE}; -- ${OWNER}".to_vec(),
    );
    let mut vars = TemplateVariables::new();
    vars.insert("APP_ROLE".to_string(), "reader".to_string());

    let rendered = file.render(&vars).unwrap();
    assert_eq!(rendered, "GRANT SELECT ON t TO reader; -- ${OWNER}");
    assert_eq!(
        unresolved_names(file.text().unwrap(), &vars),
        vec!["OWNER".to_string()]
    );
}

#[test]
fn test_invalid_utf8_cannot_render() {
    let file = MigrationFile::new("bad.sql", "m/bad.sql", vec![0x53, 0xff, 0xfe]);
    let err = file.render(&TemplateVariables::new()).unwrap_err();
    assert!(matches!(err, CoreError::ScriptEncoding { ref name, .. } if name == "bad.sql"));
    // The checksum is still computable
    assert_eq!(file.checksum.len(), 32);
}

#[test]
fn test_load_through_catalog() {
    let mut source = MemoryFileSource::new();
    source.insert("migrations/v0.1.0_initial_schema.sql", "CREATE TABLE users ();");
    let catalog = Catalog::new(&source);
    let entries = catalog
        .discover(&DirectorySetting::defaulted("migrations"))
        .unwrap();

    let file = MigrationFile::load(&catalog, &entries[0]).unwrap();
    assert_eq!(file.name, "v0.1.0_initial_schema.sql");
    assert_eq!(file.description, "v0.1.0 initial schema");
    assert_eq!(file.text().unwrap(), "CREATE TABLE users ();");
}

#[test]
fn test_attempt_carries_file_identity() {
    let file = MigrationFile::new("v2_x.sql", "m/v2_x.sql", b"SELECT 1;".to_vec());
    let attempt = file.attempt("deployer");
    assert_eq!(attempt.script, "v2_x.sql");
    assert_eq!(attempt.description, "v2 x");
    assert_eq!(attempt.checksum, file.checksum);
    assert_eq!(attempt.installed_by, "deployer");
}

#[test]
fn test_duration_millis_saturates() {
    assert_eq!(duration_millis(Duration::from_millis(1500)), 1500);
    assert_eq!(duration_millis(Duration::from_secs(u64::MAX / 2)), i32::MAX);
}
