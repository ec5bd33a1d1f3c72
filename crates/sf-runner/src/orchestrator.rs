//! The per-invocation state machine behind `migrate`, `seed`, and `info`
//!
//! Provision → diff → execute → report. The diff verifies every applied
//! checksum before any pending file runs; execution is fail-fast and each
//! file is its own transaction.

use crate::after_migrate::AfterMigrateRunner;
use crate::cancel::CancelFlag;
use crate::error::RunnerResult;
use crate::report::{
    AppliedMigration, FailedScript, InfoReport, MigrateReport, PendingScript, Preview, SeedReport,
};
use crate::seed::SeedRunner;
use sf_core::{Catalog, FileSource, MigrationFile, MigrationPlan, MigrationRecord, ResolvedConfig};
use sf_db::Database;

/// Coordinates one command against one target database
pub struct Orchestrator<'a> {
    db: &'a dyn Database,
    files: &'a dyn FileSource,
    config: &'a ResolvedConfig,
    cancel: CancelFlag,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        db: &'a dyn Database,
        files: &'a dyn FileSource,
        config: &'a ResolvedConfig,
    ) -> Self {
        Self {
            db,
            files,
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Use a flag shared with an interrupt handler
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Ledger rows; a missing ledger reads as empty when `create` is false
    async fn load_ledger(&self, create: bool) -> RunnerResult<Vec<MigrationRecord>> {
        if create {
            self.db.ensure_ledger().await?;
        } else if !self.db.ledger_exists().await? {
            log::debug!("No ledger table yet in {}", self.db.database_name());
            return Ok(Vec::new());
        }
        Ok(self.db.load_applied().await?)
    }

    fn load_migrations(&self) -> RunnerResult<Vec<MigrationFile>> {
        let catalog = Catalog::new(self.files);
        let files = catalog
            .discover(&self.config.migrations_dir)?
            .iter()
            .map(|entry| MigrationFile::load(&catalog, entry))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "Found {} migration file(s) in {}",
            files.len(),
            self.config.migrations_dir
        );
        Ok(files)
    }

    /// Catalog the migrations and diff them against the ledger
    async fn plan(&self, create_ledger: bool) -> RunnerResult<MigrationPlan> {
        let records = self.load_ledger(create_ledger).await?;
        let files = self.load_migrations()?;
        Ok(MigrationPlan::build(files, records)?)
    }

    fn after_migrate(&self) -> AfterMigrateRunner<'_> {
        AfterMigrateRunner::new(
            self.db,
            self.files,
            &self.config.after_migrate_dir,
            &self.config.variables,
        )
    }

    /// Apply pending migrations in order, then the afterMigrate scripts.
    ///
    /// Fatal problems found before execution (ledger, checksums) are
    /// returned as errors. A failure during execution is reported in the
    /// returned report; see [`MigrateReport::status`].
    pub async fn migrate(&self, dry_run: bool) -> RunnerResult<MigrateReport> {
        let plan = self.plan(!dry_run).await?;
        let mut report = MigrateReport {
            dry_run,
            pending_before: plan.pending.len(),
            ..Default::default()
        };

        if dry_run {
            for file in &plan.pending {
                report.previews.push(Preview {
                    script: file.name.clone(),
                    sql: file.render(&self.config.variables)?,
                });
            }
            report.after_migrate_previews = self.after_migrate().preview()?;
            return Ok(report);
        }

        if plan.is_up_to_date() {
            log::info!("No pending migrations; database is up to date");
        }

        let installed_by = self.config.installed_by();
        for (index, file) in plan.pending.iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::warn!("Interrupted before migration {}", file.name);
                report.interrupted_before = Some(plan.pending.len() - index);
                break;
            }

            let attempt = file.attempt(installed_by);
            let (duration_ms, result) = match file.render(&self.config.variables) {
                Ok(sql) => {
                    log::debug!("Applying {} ({} bytes)", file.name, sql.len());
                    let outcome = self.db.apply_migration(&sql, &attempt).await;
                    (
                        outcome.duration_ms(),
                        outcome.result.map_err(|e| e.to_string()),
                    )
                }
                Err(e) => (0, Err(e.to_string())),
            };

            match result {
                Ok(record) => {
                    log::info!(
                        "Applied {} as rank {} ({}ms)",
                        file.name,
                        record.installed_rank,
                        duration_ms
                    );
                    report.applied.push(AppliedMigration {
                        script: file.name.clone(),
                        installed_rank: record.installed_rank,
                        duration_ms,
                    });
                }
                Err(error) => {
                    log::error!("Migration {} failed: {}", file.name, error);
                    let recorded = self.db.record_attempt(&attempt, duration_ms, false).await;
                    let ledger_error = match recorded {
                        Ok(_) => None,
                        Err(e) => {
                            log::error!("Could not record failure of {}: {}", file.name, e);
                            Some(e.to_string())
                        }
                    };
                    report.failed = Some(FailedScript {
                        script: file.name.clone(),
                        error,
                        duration_ms,
                        recorded: ledger_error.is_none(),
                        ledger_error,
                    });
                    break;
                }
            }
        }

        let should_run_after = report.interrupted_before.is_none()
            && (!report.applied.is_empty() || report.pending_before == 0);
        if should_run_after {
            report.after_migrate = self.after_migrate().run().await;
            report.after_migrate_ran = true;
        } else {
            log::debug!("Skipping afterMigrate scripts");
        }

        Ok(report)
    }

    /// Load the seed scripts; nothing is tracked
    pub async fn seed(&self, dry_run: bool) -> RunnerResult<SeedReport> {
        SeedRunner::new(
            self.db,
            self.files,
            &self.config.seeds_dir,
            &self.config.variables,
            self.cancel.clone(),
        )
        .run(dry_run)
        .await
    }

    /// Applied versus pending migrations; writes nothing
    pub async fn info(&self, database_exists: bool) -> RunnerResult<InfoReport> {
        let ledger_exists = self.db.ledger_exists().await?;
        let plan = self.plan(false).await?;
        Ok(InfoReport {
            database: self.config.connection.database.clone(),
            database_exists,
            ledger_exists,
            pending: plan.pending.iter().map(PendingScript::from).collect(),
            ledger: plan.ledger,
        })
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
