//! Migrate command implementation

use anyhow::Result;
use sf_core::LocalFileSource;
use sf_runner::{open_target, Access, MigrateReport, Orchestrator};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{self, fail};
use crate::context;

/// Execute the migrate command
pub async fn execute(_args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let config = context::load_config(global)?;
    let access = if global.dry_run {
        Access::ReadOnly
    } else {
        Access::Migrate
    };

    let opened = open_target(&config.connection, access).await.map_err(fail)?;
    if opened.created {
        println!("✓ Created database {}", config.connection.database);
    }

    let files = LocalFileSource;
    let result = Orchestrator::new(opened.target.database(), &files, &config)
        .with_cancel(common::interrupt_flag())
        .migrate(global.dry_run)
        .await;
    opened.target.close().await;

    let report = result.map_err(fail)?;
    if report.dry_run {
        print_dry_run(&report);
    } else {
        print_report(&report);
    }
    report.status().map_err(fail)
}

fn print_dry_run(report: &MigrateReport) {
    println!("Dry run: no changes will be made\n");
    if report.previews.is_empty() {
        println!("No pending migrations. Database is up to date.");
    } else {
        println!("Would apply {} migration(s):", report.previews.len());
        common::print_previews(&report.previews);
    }
    if !report.after_migrate_previews.is_empty() {
        println!(
            "\nWould run {} afterMigrate script(s):",
            report.after_migrate_previews.len()
        );
        common::print_previews(&report.after_migrate_previews);
    }
}

fn print_report(report: &MigrateReport) {
    if report.pending_before == 0 {
        println!("No pending migrations. Database is up to date.");
    } else {
        println!("Applying {} pending migration(s)...\n", report.pending_before);
    }

    for applied in &report.applied {
        println!("  ✓ {} ({}ms)", applied.script, applied.duration_ms);
    }
    if let Some(failed) = &report.failed {
        println!("  ✗ {} - {}", failed.script, failed.error);
        if failed.recorded {
            println!("    recorded as failed in the ledger");
        }
    }

    if report.after_migrate_ran && !report.after_migrate.is_empty() {
        println!("\nafterMigrate:");
        for outcome in &report.after_migrate {
            match &outcome.error {
                None => println!("  ✓ {} ({}ms)", outcome.script, outcome.duration_ms),
                Some(err) => println!("  ✗ {} - {}", outcome.script, err),
            }
        }
        let failures = report.after_migrate_failures();
        if failures > 0 {
            println!("  {} afterMigrate script(s) failed; continuing", failures);
        }
    }

    println!("\n{}", report.summary());
}
