//! Sample-data scripts: rendered and executed like migrations, but never
//! tracked in the ledger and never checksum-verified.

use crate::cancel::CancelFlag;
use crate::error::RunnerResult;
use crate::report::{FailedScript, Preview, ScriptRun, SeedReport};
use sf_core::{Catalog, DirectorySetting, FileSource, MigrationFile, TemplateVariables};
use sf_db::Database;

/// Runs the scripts in the seeds directory, stopping at the first failure
pub struct SeedRunner<'a> {
    db: &'a dyn Database,
    files: &'a dyn FileSource,
    dir: &'a DirectorySetting,
    variables: &'a TemplateVariables,
    cancel: CancelFlag,
}

impl<'a> SeedRunner<'a> {
    pub fn new(
        db: &'a dyn Database,
        files: &'a dyn FileSource,
        dir: &'a DirectorySetting,
        variables: &'a TemplateVariables,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            db,
            files,
            dir,
            variables,
            cancel,
        }
    }

    pub async fn run(&self, dry_run: bool) -> RunnerResult<SeedReport> {
        let catalog = Catalog::new(self.files);
        let seeds = catalog
            .discover_required(self.dir)?
            .iter()
            .map(|entry| MigrationFile::load(&catalog, entry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = SeedReport {
            dry_run,
            total: seeds.len(),
            ..Default::default()
        };

        if seeds.is_empty() {
            log::info!("No seed scripts found in {}", self.dir);
            return Ok(report);
        }

        if dry_run {
            for seed in &seeds {
                report.previews.push(Preview {
                    script: seed.name.clone(),
                    sql: seed.render(self.variables)?,
                });
            }
            return Ok(report);
        }

        for (index, seed) in seeds.iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::warn!("Interrupted before seed {}", seed.name);
                report.interrupted_before = Some(seeds.len() - index);
                break;
            }

            let (duration_ms, result) = match seed.render(self.variables) {
                Ok(sql) => {
                    let outcome = self.db.run_script(&sql).await;
                    (
                        outcome.duration_ms(),
                        outcome.result.map_err(|e| e.to_string()),
                    )
                }
                Err(e) => (0, Err(e.to_string())),
            };

            match result {
                Ok(()) => {
                    log::info!("Seed {} executed ({}ms)", seed.name, duration_ms);
                    report.executed.push(ScriptRun {
                        script: seed.name.clone(),
                        duration_ms,
                    });
                }
                Err(error) => {
                    log::error!("Seed {} failed: {}", seed.name, error);
                    report.failed = Some(FailedScript {
                        script: seed.name.clone(),
                        error,
                        duration_ms,
                        recorded: false,
                        ledger_error: None,
                    });
                    break;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
