//! In-memory database double for orchestrator tests
//!
//! Committed scripts are kept in order as the "schema"; a script containing
//! any configured failure marker fails and leaves nothing behind.

use async_trait::async_trait;
use sf_core::migration::duration_millis;
use sf_core::{LedgerAttempt, MigrationRecord};
use sf_db::{DatabaseCore, DatabaseLedger, DbError, DbResult, ScriptOutcome};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct State {
    ledger_created: bool,
    records: Vec<MigrationRecord>,
    next_rank: i32,
    committed: Vec<String>,
    writes: usize,
}

#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
    fail_markers: Vec<String>,
    fail_ledger_writes: bool,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts containing `marker` fail
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_markers.push(marker.to_string());
        self
    }

    /// `record_attempt` always fails
    pub fn with_broken_ledger_writes(mut self) -> Self {
        self.fail_ledger_writes = true;
        self
    }

    /// Seed a pre-existing ledger
    pub fn with_records(self, records: Vec<MigrationRecord>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.ledger_created = true;
            state.next_rank = records.iter().map(|r| r.installed_rank).max().unwrap_or(0);
            state.records = records;
        }
        self
    }

    pub fn records(&self) -> Vec<MigrationRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Committed script bodies in execution order
    pub fn committed(&self) -> Vec<String> {
        self.state.lock().unwrap().committed.clone()
    }

    /// Number of mutating calls that reached the database
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn ledger_created(&self) -> bool {
        self.state.lock().unwrap().ledger_created
    }

    fn check(&self, sql: &str) -> DbResult<()> {
        match self.fail_markers.iter().find(|m| sql.contains(m.as_str())) {
            Some(marker) => Err(DbError::ExecutionError(format!(
                "simulated failure at '{}'",
                marker
            ))),
            None => Ok(()),
        }
    }

    fn append(
        state: &mut State,
        attempt: &LedgerAttempt,
        ms: i32,
        success: bool,
    ) -> MigrationRecord {
        state
            .records
            .retain(|r| !(r.script == attempt.script && !r.success));
        state.next_rank += 1;
        let record = MigrationRecord {
            installed_rank: state.next_rank,
            script: attempt.script.clone(),
            description: attempt.description.clone(),
            checksum: attempt.checksum.clone(),
            installed_by: attempt.installed_by.clone(),
            installed_on: chrono::Utc::now().naive_utc(),
            execution_time_ms: ms,
            success,
        };
        state.records.push(record.clone());
        record
    }
}

#[async_trait]
impl DatabaseCore for MemoryDatabase {
    async fn run_script(&self, sql: &str) -> ScriptOutcome {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let result = self.check(sql).map(|()| {
            if !sql.trim().is_empty() {
                state.committed.push(sql.to_string());
            }
        });
        ScriptOutcome {
            duration: Duration::from_millis(1),
            result,
        }
    }

    fn db_type(&self) -> &'static str {
        "memory"
    }

    fn database_name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl DatabaseLedger for MemoryDatabase {
    async fn ledger_exists(&self) -> DbResult<bool> {
        Ok(self.state.lock().unwrap().ledger_created)
    }

    async fn ensure_ledger(&self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.ledger_created {
            state.ledger_created = true;
            state.writes += 1;
        }
        Ok(())
    }

    async fn load_applied(&self) -> DbResult<Vec<MigrationRecord>> {
        let state = self.state.lock().unwrap();
        if !state.ledger_created {
            return Err(DbError::LedgerError(
                "relation \"schema_migrations\" does not exist".to_string(),
            ));
        }
        Ok(state.records.clone())
    }

    async fn record_attempt(
        &self,
        attempt: &LedgerAttempt,
        execution_time_ms: i32,
        success: bool,
    ) -> DbResult<MigrationRecord> {
        if self.fail_ledger_writes {
            return Err(DbError::LedgerError("simulated ledger outage".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        Ok(Self::append(&mut state, attempt, execution_time_ms, success))
    }

    async fn apply_migration(
        &self,
        sql: &str,
        attempt: &LedgerAttempt,
    ) -> ScriptOutcome<MigrationRecord> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let duration = Duration::from_millis(2);
        let result = self.check(sql).map(|()| {
            if !sql.trim().is_empty() {
                state.committed.push(sql.to_string());
            }
            Self::append(&mut state, attempt, duration_millis(duration), true)
        });
        ScriptOutcome { duration, result }
    }
}
