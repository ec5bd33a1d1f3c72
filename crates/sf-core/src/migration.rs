//! Migration data model: on-disk script files and ledger records.

use crate::catalog::{Catalog, ScriptEntry};
use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use crate::template::{render, unresolved_names, TemplateVariables};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Maximum description length stored in the ledger
pub const DESCRIPTION_MAX_LEN: usize = 200;

/// A discovered script with its raw content and checksum.
///
/// Used for migrations, seeds, and afterMigrate scripts alike; only
/// migrations are ever compared against the ledger. Exists for a single
/// invocation and is rebuilt from disk every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Filename, unique within its directory
    pub name: String,

    /// Full path to the file
    pub path: PathBuf,

    /// Human-readable description derived from the filename
    pub description: String,

    /// File bytes exactly as stored
    pub raw_content: Vec<u8>,

    /// Checksum of `raw_content`
    pub checksum: String,
}

impl MigrationFile {
    /// Build from a name, path, and raw bytes
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, raw_content: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            description: describe(&name),
            checksum: compute_checksum(&raw_content),
            path: path.into(),
            name,
            raw_content,
        }
    }

    /// Read a catalog entry into a file
    pub fn load(catalog: &Catalog<'_>, entry: &ScriptEntry) -> CoreResult<Self> {
        let raw = catalog.read(entry)?;
        Ok(Self::new(entry.name.clone(), entry.path.clone(), raw))
    }

    /// Raw content as text
    pub fn text(&self) -> CoreResult<&str> {
        std::str::from_utf8(&self.raw_content).map_err(|e| CoreError::ScriptEncoding {
            name: self.name.clone(),
            details: e.to_string(),
        })
    }

    /// Rendered content, computed on demand from the raw text
    pub fn render(&self, variables: &TemplateVariables) -> CoreResult<String> {
        let text = self.text()?;
        if log::log_enabled!(log::Level::Debug) {
            let unresolved = unresolved_names(text, variables);
            if !unresolved.is_empty() {
                log::debug!(
                    "{} keeps unresolved placeholders: {}",
                    self.name,
                    unresolved.join(", ")
                );
            }
        }
        Ok(render(text, variables))
    }

    /// Ledger values for an attempt to apply this file
    pub fn attempt(&self, installed_by: &str) -> LedgerAttempt {
        LedgerAttempt {
            script: self.name.clone(),
            description: self.description.clone(),
            checksum: self.checksum.clone(),
            installed_by: installed_by.to_string(),
        }
    }
}

/// Derive a description from a script filename.
///
/// `v0.1.0_initial_schema.sql` becomes `v0.1.0 initial schema`.
pub fn describe(name: &str) -> String {
    let stem = name
        .strip_suffix(".sql")
        .unwrap_or(name)
        .replace('_', " ");
    stem.chars().take(DESCRIPTION_MAX_LEN).collect()
}

/// A row in the ledger relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Monotonic sequence assigned by the ledger on insert
    pub installed_rank: i32,

    /// Script filename
    pub script: String,

    pub description: String,

    /// Checksum of the raw file content at apply time
    pub checksum: String,

    pub installed_by: String,

    pub installed_on: NaiveDateTime,

    /// Execution time in milliseconds
    pub execution_time_ms: i32,

    /// False marks a failed attempt, not a protective seal
    pub success: bool,
}

/// Values for one ledger insert; rank and timestamp come from the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAttempt {
    pub script: String,
    pub description: String,
    pub checksum: String,
    pub installed_by: String,
}

/// Convert an elapsed duration to the ledger's integer milliseconds
pub fn duration_millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
