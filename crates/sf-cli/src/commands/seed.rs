//! Seed command implementation

use anyhow::Result;
use sf_core::LocalFileSource;
use sf_runner::{open_target, Access, Orchestrator, SeedReport};

use crate::cli::{GlobalArgs, SeedArgs};
use crate::commands::common::{self, fail};
use crate::context;

/// Execute the seed command
pub async fn execute(_args: &SeedArgs, global: &GlobalArgs) -> Result<()> {
    let config = context::load_config(global)?;
    let access = if global.dry_run {
        Access::ReadOnly
    } else {
        Access::Seed
    };

    let opened = open_target(&config.connection, access).await.map_err(fail)?;
    let files = LocalFileSource;
    let result = Orchestrator::new(opened.target.database(), &files, &config)
        .with_cancel(common::interrupt_flag())
        .seed(global.dry_run)
        .await;
    opened.target.close().await;

    let report = result.map_err(fail)?;
    print_report(&report);
    report.status().map_err(fail)
}

fn print_report(report: &SeedReport) {
    if report.total == 0 {
        println!("No seed files found.");
        return;
    }

    if report.dry_run {
        println!("Dry run: no changes will be made\n");
        println!("Would load {} seed(s):", report.previews.len());
        common::print_previews(&report.previews);
        return;
    }

    println!("Loading {} seeds...\n", report.total);
    for run in &report.executed {
        println!("  ✓ {} ({}ms)", run.script, run.duration_ms);
    }
    if let Some(failed) = &report.failed {
        println!("  ✗ {} - {}", failed.script, failed.error);
    }

    println!(
        "\nLoaded {} of {} seed(s)",
        report.executed.len(),
        report.total
    );
}
