//! Command reports
//!
//! Reports are plain data: the orchestrator fills them in and the CLI
//! renders them as text or JSON. Execution-phase failures live in the
//! report so the summary can still be printed; `status()` turns them into
//! the fatal error.

use crate::error::{RunnerError, RunnerResult};
use serde::Serialize;
use sf_core::{LedgerEntry, LedgerEntryState, MigrationFile};

/// Rendered SQL of a script that would run
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub script: String,
    pub sql: String,
}

/// A migration committed during this run
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    pub script: String,
    pub installed_rank: i32,
    pub duration_ms: i32,
}

/// A script that ran to completion without ledger tracking
#[derive(Debug, Clone, Serialize)]
pub struct ScriptRun {
    pub script: String,
    pub duration_ms: i32,
}

/// The script that stopped a run
#[derive(Debug, Clone, Serialize)]
pub struct FailedScript {
    pub script: String,
    pub error: String,
    pub duration_ms: i32,

    /// Whether a `success = false` row made it into the ledger
    pub recorded: bool,

    /// Why recording the failure itself failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_error: Option<String>,
}

/// Result of one afterMigrate script
#[derive(Debug, Clone, Serialize)]
pub struct AfterMigrateOutcome {
    pub script: String,
    pub duration_ms: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AfterMigrateOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a `migrate` invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrateReport {
    pub dry_run: bool,

    /// Pending migrations found before anything ran
    pub pending_before: usize,

    pub applied: Vec<AppliedMigration>,

    pub failed: Option<FailedScript>,

    /// Pending files left untouched after an interrupt
    pub interrupted_before: Option<usize>,

    /// Dry run only: what would be applied, in order
    pub previews: Vec<Preview>,

    pub after_migrate_ran: bool,

    pub after_migrate: Vec<AfterMigrateOutcome>,

    /// Dry run only: afterMigrate scripts that would run
    pub after_migrate_previews: Vec<Preview>,
}

impl MigrateReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn failed_count(&self) -> usize {
        usize::from(self.failed.is_some())
    }

    /// afterMigrate scripts that raised an error
    pub fn after_migrate_failures(&self) -> usize {
        self.after_migrate.iter().filter(|o| !o.succeeded()).count()
    }

    /// `Applied: N, Pending: M, Failed: F`
    pub fn summary(&self) -> String {
        format!(
            "Applied: {}, Pending: {}, Failed: {}",
            self.applied_count(),
            self.pending_before,
            self.failed_count()
        )
    }

    /// The fatal error this run ended with, if any
    pub fn status(&self) -> RunnerResult<()> {
        if let Some(failed) = &self.failed {
            return Err(match &failed.ledger_error {
                Some(ledger_error) => RunnerError::LedgerWrite {
                    script: failed.script.clone(),
                    migration_error: failed.error.clone(),
                    ledger_error: ledger_error.clone(),
                },
                None => RunnerError::MigrationExecution {
                    script: failed.script.clone(),
                    message: failed.error.clone(),
                },
            });
        }
        if let Some(remaining) = self.interrupted_before {
            return Err(RunnerError::Interrupted { remaining });
        }
        Ok(())
    }
}

/// Summary of a `seed` invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub dry_run: bool,
    pub total: usize,
    pub executed: Vec<ScriptRun>,
    pub failed: Option<FailedScript>,
    pub interrupted_before: Option<usize>,
    pub previews: Vec<Preview>,
}

impl SeedReport {
    pub fn status(&self) -> RunnerResult<()> {
        if let Some(failed) = &self.failed {
            return Err(RunnerError::SeedExecution {
                script: failed.script.clone(),
                message: failed.error.clone(),
            });
        }
        if let Some(remaining) = self.interrupted_before {
            return Err(RunnerError::Interrupted { remaining });
        }
        Ok(())
    }
}

/// A file with no successful ledger row
#[derive(Debug, Clone, Serialize)]
pub struct PendingScript {
    pub script: String,
    pub description: String,
    pub checksum: String,
}

impl From<&MigrationFile> for PendingScript {
    fn from(file: &MigrationFile) -> Self {
        Self {
            script: file.name.clone(),
            description: file.description.clone(),
            checksum: file.checksum.clone(),
        }
    }
}

/// Read-only view of applied versus pending migrations
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub database: String,
    pub database_exists: bool,
    pub ledger_exists: bool,
    pub ledger: Vec<LedgerEntry>,
    pub pending: Vec<PendingScript>,
}

impl InfoReport {
    /// Successful ledger rows
    pub fn applied_count(&self) -> usize {
        self.ledger.iter().filter(|e| e.record.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.ledger
            .iter()
            .filter(|e| e.state == LedgerEntryState::Failed)
            .count()
    }

    pub fn missing_count(&self) -> usize {
        self.ledger
            .iter()
            .filter(|e| e.state == LedgerEntryState::MissingOnDisk)
            .count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Applied: {}, Pending: {}",
            self.applied_count(),
            self.pending.len()
        )
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
