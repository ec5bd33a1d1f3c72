use super::*;
use crate::checksum::compute_checksum;
use chrono::NaiveDate;

fn file(name: &str, body: &str) -> MigrationFile {
    MigrationFile::new(name, format!("migrations/{}", name), body.as_bytes().to_vec())
}

fn record(rank: i32, script: &str, body: &str, success: bool) -> MigrationRecord {
    MigrationRecord {
        installed_rank: rank,
        script: script.to_string(),
        description: script.to_string(),
        checksum: compute_checksum(body.as_bytes()),
        installed_by: "deployer".to_string(),
        installed_on: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        execution_time_ms: 5,
        success,
    }
}

#[test]
fn test_fresh_database_everything_pending() {
    let files = vec![file("v1_a.sql", "A"), file("v2_b.sql", "B")];
    let plan = MigrationPlan::build(files, vec![]).unwrap();

    assert_eq!(plan.pending.len(), 2);
    assert_eq!(plan.pending[0].name, "v1_a.sql");
    assert_eq!(plan.pending[1].name, "v2_b.sql");
    assert!(plan.ledger.is_empty());
    assert!(!plan.is_up_to_date());
}

#[test]
fn test_applied_files_are_not_pending() {
    let files = vec![file("v1_a.sql", "A"), file("v2_b.sql", "B")];
    let records = vec![record(1, "v1_a.sql", "A", true)];
    let plan = MigrationPlan::build(files, records).unwrap();

    assert_eq!(plan.pending.len(), 1);
    assert_eq!(plan.pending[0].name, "v2_b.sql");
    assert_eq!(plan.applied_count(), 1);
    assert_eq!(plan.ledger[0].state, LedgerEntryState::Applied);
}

#[test]
fn test_pending_keeps_catalog_order_around_applied_files() {
    let files = vec![
        file("v1_a.sql", "A"),
        file("v2_b.sql", "B"),
        file("v3_c.sql", "C"),
    ];
    let records = vec![record(1, "v2_b.sql", "B", true)];
    let plan = MigrationPlan::build(files, records).unwrap();

    let names: Vec<&str> = plan.pending.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["v1_a.sql", "v3_c.sql"]);
}

#[test]
fn test_modified_applied_file_is_checksum_mismatch() {
    let files = vec![file("v1_a.sql", "A edited"), file("v2_b.sql", "B")];
    let records = vec![record(1, "v1_a.sql", "A", true)];
    let err = MigrationPlan::build(files, records).unwrap_err();

    match err {
        CoreError::ChecksumMismatch {
            script,
            recorded,
            current,
        } => {
            assert_eq!(script, "v1_a.sql");
            assert_eq!(recorded, compute_checksum(b"A"));
            assert_eq!(current, compute_checksum(b"A edited"));
        }
        other => panic!("expected checksum mismatch, got {other:?}"),
    }
}

#[test]
fn test_md5sum_recorded_row_verifies_unchanged_file() {
    // Row as written by an earlier tool from `md5sum` of the same file.
    let body = "CREATE TABLE users (id SERIAL PRIMARY KEY);\n";
    let mut row = record(1, "v0.1.0_initial_schema.sql", body, true);
    row.checksum = "eeb4fe9a06788542694bdae4d0ce4931".to_string();

    let files = vec![
        file("v0.1.0_initial_schema.sql", body),
        file("v0.2.0_orders.sql", "CREATE TABLE orders (id INT);"),
    ];
    let plan = MigrationPlan::build(files, vec![row]).unwrap();

    assert_eq!(plan.applied_count(), 1);
    assert_eq!(plan.ledger[0].state, LedgerEntryState::Applied);
    assert_eq!(plan.pending.len(), 1);
    assert_eq!(plan.pending[0].name, "v0.2.0_orders.sql");
}

#[test]
fn test_failed_record_is_not_verified_and_is_retried() {
    let files = vec![file("v1_a.sql", "A corrected"), file("v2_b.sql", "B")];
    let records = vec![record(1, "v1_a.sql", "A broken", false)];
    let plan = MigrationPlan::build(files, records).unwrap();

    let names: Vec<&str> = plan.pending.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["v1_a.sql", "v2_b.sql"]);
    assert_eq!(plan.failed_scripts(), vec!["v1_a.sql"]);
    assert_eq!(plan.ledger[0].state, LedgerEntryState::Failed);
    assert_eq!(plan.applied_count(), 0);
}

#[test]
fn test_ledger_rows_without_files_are_flagged() {
    let files = vec![file("v2_b.sql", "B")];
    let records = vec![
        record(2, "v2_b.sql", "B", true),
        record(1, "v1_removed.sql", "A", true),
    ];
    let plan = MigrationPlan::build(files, records).unwrap();

    assert!(plan.is_up_to_date());
    assert_eq!(plan.ledger[0].record.script, "v1_removed.sql");
    assert_eq!(plan.ledger[0].state, LedgerEntryState::MissingOnDisk);
    assert_eq!(plan.ledger[1].state, LedgerEntryState::Applied);
}

#[test]
fn test_ledger_entry_state_serializes_snake_case() {
    let json = serde_json::to_string(&LedgerEntryState::MissingOnDisk).unwrap();
    assert_eq!(json, "\"missing_on_disk\"");
}
