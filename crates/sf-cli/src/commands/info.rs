//! Info command implementation

use anyhow::{Context, Result};
use sf_core::{LedgerEntryState, LocalFileSource};
use sf_runner::{open_target, Access, InfoReport, Orchestrator};

use crate::cli::{GlobalArgs, InfoArgs, InfoOutput};
use crate::commands::common::fail;
use crate::context;

/// Execute the info command
pub async fn execute(args: &InfoArgs, global: &GlobalArgs) -> Result<()> {
    if global.dry_run {
        log::warn!("--dry-run has no effect on info; it never changes the database");
    }
    let config = context::load_config(global)?;

    let opened = open_target(&config.connection, Access::ReadOnly)
        .await
        .map_err(fail)?;
    let files = LocalFileSource;
    let result = Orchestrator::new(opened.target.database(), &files, &config)
        .info(opened.target.exists())
        .await;
    opened.target.close().await;

    let report = result.map_err(fail)?;
    match args.output {
        InfoOutput::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize info report")?;
            println!("{}", json);
        }
        InfoOutput::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &InfoReport) {
    println!("Database: {}", report.database);
    if !report.database_exists {
        println!("  (does not exist yet)");
    } else if !report.ledger_exists {
        println!("  (no migrations applied yet)");
    }

    println!("\nApplied migrations: {}", report.applied_count());
    for entry in &report.ledger {
        let record = &entry.record;
        let marker = if record.success { "✓" } else { "✗" };
        let note = match entry.state {
            LedgerEntryState::Applied => "",
            LedgerEntryState::Failed => "  [failed, will retry]",
            LedgerEntryState::MissingOnDisk => "  [file missing]",
        };
        println!(
            "  {} {:>4}  {}  {}  ({}ms){}",
            marker,
            record.installed_rank,
            record.script,
            record.installed_on.format("%Y-%m-%d %H:%M:%S"),
            record.execution_time_ms,
            note
        );
    }

    println!("\nPending migrations: {}", report.pending.len());
    for pending in &report.pending {
        println!("  • {}", pending.script);
    }
    if report.pending.is_empty() {
        println!("  Database is up to date");
    }

    println!("\n{}", report.summary());
}
