use super::*;
use crate::test_utils::MemoryDatabase;
use sf_core::MemoryFileSource;

fn source(files: &[(&str, &str)]) -> MemoryFileSource {
    let mut fs = MemoryFileSource::new();
    fs.add_dir("afterMigrate");
    for (name, body) in files {
        fs.insert(format!("afterMigrate/{}", name), body.as_bytes().to_vec());
    }
    fs
}

#[tokio::test]
async fn test_failure_does_not_block_later_scripts() {
    let fs = source(&[
        ("01_analyze.sql", "ANALYZE;"),
        ("02_broken.sql", "BOOM"),
        ("03_refresh.sql", "REFRESH MATERIALIZED VIEW mv;"),
    ]);
    let db = MemoryDatabase::new().failing_on("BOOM");
    let dir = DirectorySetting::defaulted("afterMigrate");
    let vars = TemplateVariables::new();

    let outcomes = AfterMigrateRunner::new(&db, &fs, &dir, &vars).run().await;

    let names: Vec<&str> = outcomes.iter().map(|o| o.script.as_str()).collect();
    assert_eq!(names, vec!["01_analyze.sql", "02_broken.sql", "03_refresh.sql"]);
    assert!(outcomes[0].succeeded());
    assert!(!outcomes[1].succeeded());
    assert!(outcomes[2].succeeded());
    assert_eq!(
        db.committed(),
        vec!["ANALYZE;", "REFRESH MATERIALIZED VIEW mv;"]
    );
}

#[tokio::test]
async fn test_missing_directory_runs_nothing() {
    let fs = MemoryFileSource::new();
    let db = MemoryDatabase::new();
    let dir = DirectorySetting::explicit("afterMigrate");
    let vars = TemplateVariables::new();

    let outcomes = AfterMigrateRunner::new(&db, &fs, &dir, &vars).run().await;

    assert!(outcomes.is_empty());
    assert_eq!(db.writes(), 0);
}

#[tokio::test]
async fn test_templates_are_rendered() {
    let fs = source(&[("stats.sql", "ANALYZE ${SCHEMA}.users;")]);
    let db = MemoryDatabase::new();
    let dir = DirectorySetting::defaulted("afterMigrate");
    let vars = TemplateVariables::from([("SCHEMA".to_string(), "app".to_string())]);

    AfterMigrateRunner::new(&db, &fs, &dir, &vars).run().await;

    assert_eq!(db.committed(), vec!["ANALYZE app.users;"]);
}

#[tokio::test]
async fn test_invalid_utf8_is_that_files_failure() {
    let mut fs = source(&[("b.sql", "SELECT 1;")]);
    fs.insert("afterMigrate/a.sql", vec![0xff, 0xfe]);
    let db = MemoryDatabase::new();
    let dir = DirectorySetting::defaulted("afterMigrate");
    let vars = TemplateVariables::new();

    let outcomes = AfterMigrateRunner::new(&db, &fs, &dir, &vars).run().await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].error.as_deref().unwrap().contains("[E005]"));
    assert!(outcomes[1].succeeded());
}

#[test]
fn test_preview_does_not_touch_database() {
    let fs = source(&[("stats.sql", "ANALYZE;")]);
    let db = MemoryDatabase::new();
    let dir = DirectorySetting::defaulted("afterMigrate");
    let vars = TemplateVariables::new();

    let previews = AfterMigrateRunner::new(&db, &fs, &dir, &vars)
        .preview()
        .unwrap();

    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].sql, "ANALYZE;");
    assert_eq!(db.writes(), 0);
}
