//! Diff between the migration files on disk and the ledger.
//!
//! Building a [`MigrationPlan`] is the only place checksums are verified:
//! every file whose script name has a successful ledger record must still
//! hash to the recorded checksum, otherwise the plan is refused and nothing
//! downstream runs.

use crate::error::{CoreError, CoreResult};
use crate::migration::{MigrationFile, MigrationRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How a ledger row relates to the files currently on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryState {
    /// Applied successfully and the file is still present
    Applied,
    /// A failed attempt; the script is pending again and the row is
    /// superseded by the next attempt
    Failed,
    /// The ledger knows the script but the file is gone
    MissingOnDisk,
}

/// A ledger row annotated with its on-disk state
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub record: MigrationRecord,
    pub state: LedgerEntryState,
}

/// Result of diffing the catalog against the ledger
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    /// Ledger rows in `installed_rank` order
    pub ledger: Vec<LedgerEntry>,

    /// Files with no ledger row or only a failed one, in catalog order
    pub pending: Vec<MigrationFile>,
}

impl MigrationPlan {
    /// Diff `files` (catalog order) against `records`.
    ///
    /// Fails with [`CoreError::ChecksumMismatch`] on the first file, in
    /// catalog order, whose successful record carries a different checksum.
    pub fn build(files: Vec<MigrationFile>, mut records: Vec<MigrationRecord>) -> CoreResult<Self> {
        records.sort_by_key(|r| r.installed_rank);
        let by_script: HashMap<&str, &MigrationRecord> =
            records.iter().map(|r| (r.script.as_str(), r)).collect();

        let mut on_disk = HashSet::new();
        let mut pending = Vec::new();

        for file in files {
            on_disk.insert(file.name.clone());
            match by_script.get(file.name.as_str()) {
                None => pending.push(file),
                Some(record) if record.success => {
                    if record.checksum != file.checksum {
                        return Err(CoreError::ChecksumMismatch {
                            script: file.name,
                            recorded: record.checksum.clone(),
                            current: file.checksum,
                        });
                    }
                }
                Some(record) => {
                    log::warn!(
                        "Migration {} failed previously (rank {}); it will be retried",
                        record.script,
                        record.installed_rank
                    );
                    pending.push(file);
                }
            }
        }

        let ledger = records
            .into_iter()
            .map(|record| {
                let state = if !on_disk.contains(&record.script) {
                    LedgerEntryState::MissingOnDisk
                } else if record.success {
                    LedgerEntryState::Applied
                } else {
                    LedgerEntryState::Failed
                };
                LedgerEntry { record, state }
            })
            .collect();

        Ok(Self { ledger, pending })
    }

    /// Number of successful ledger rows
    pub fn applied_count(&self) -> usize {
        self.ledger.iter().filter(|e| e.record.success).count()
    }

    /// Scripts whose only ledger row is a failed attempt
    pub fn failed_scripts(&self) -> Vec<&str> {
        self.ledger
            .iter()
            .filter(|e| !e.record.success)
            .map(|e| e.record.script.as_str())
            .collect()
    }

    /// True when nothing is pending
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
