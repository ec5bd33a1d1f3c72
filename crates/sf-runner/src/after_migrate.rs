//! Best-effort maintenance scripts run after a migration pass
//!
//! Every file is attempted in catalog order in its own transaction. Errors
//! are collected per file and never propagate; they are not recorded in the
//! ledger.

use crate::report::{AfterMigrateOutcome, Preview};
use sf_core::{
    Catalog, CoreResult, DirectorySetting, FileSource, MigrationFile, ScriptEntry,
    TemplateVariables,
};
use sf_db::Database;

/// Runs the scripts in the afterMigrate directory
pub struct AfterMigrateRunner<'a> {
    db: &'a dyn Database,
    files: &'a dyn FileSource,
    dir: &'a DirectorySetting,
    variables: &'a TemplateVariables,
}

impl<'a> AfterMigrateRunner<'a> {
    pub fn new(
        db: &'a dyn Database,
        files: &'a dyn FileSource,
        dir: &'a DirectorySetting,
        variables: &'a TemplateVariables,
    ) -> Self {
        Self {
            db,
            files,
            dir,
            variables,
        }
    }

    fn entries(&self) -> CoreResult<Vec<ScriptEntry>> {
        let entries = Catalog::new(self.files).discover(self.dir)?;
        if entries.is_empty() {
            log::debug!("No afterMigrate scripts in {}", self.dir);
        }
        Ok(entries)
    }

    fn load_and_render(&self, entry: &ScriptEntry) -> CoreResult<String> {
        MigrationFile::load(&Catalog::new(self.files), entry)?.render(self.variables)
    }

    /// Execute every script; the result has one outcome per file
    pub async fn run(&self) -> Vec<AfterMigrateOutcome> {
        let entries = match self.entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Skipping afterMigrate scripts: {}", e);
                return vec![AfterMigrateOutcome {
                    script: self.dir.to_string(),
                    duration_ms: 0,
                    error: Some(e.to_string()),
                }];
            }
        };

        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in &entries {
            let outcome = match self.load_and_render(entry) {
                Ok(sql) => {
                    let run = self.db.run_script(&sql).await;
                    AfterMigrateOutcome {
                        script: entry.name.clone(),
                        duration_ms: run.duration_ms(),
                        error: run.result.err().map(|e| e.to_string()),
                    }
                }
                Err(e) => AfterMigrateOutcome {
                    script: entry.name.clone(),
                    duration_ms: 0,
                    error: Some(e.to_string()),
                },
            };

            match &outcome.error {
                None => log::info!(
                    "afterMigrate {} completed ({}ms)",
                    outcome.script,
                    outcome.duration_ms
                ),
                Some(err) => log::warn!("afterMigrate {} failed: {}", outcome.script, err),
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Rendered scripts that `run` would execute
    pub fn preview(&self) -> CoreResult<Vec<Preview>> {
        self.entries()?
            .iter()
            .map(|entry| {
                Ok(Preview {
                    script: entry.name.clone(),
                    sql: self.load_and_render(entry)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "after_migrate_test.rs"]
mod tests;
