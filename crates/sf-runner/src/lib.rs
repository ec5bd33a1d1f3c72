//! sf-runner - Migration orchestration for Schemaflow
//!
//! Composes the catalog, the template renderer, and the database traits
//! into the three commands: `migrate`, `seed`, and `info`. Everything here
//! works against `dyn Database` and `dyn FileSource`, so the whole state
//! machine runs in tests without a server.

pub mod after_migrate;
pub mod cancel;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod seed;
pub mod target;

#[cfg(test)]
pub(crate) mod test_utils;

pub use after_migrate::AfterMigrateRunner;
pub use cancel::CancelFlag;
pub use error::{RunnerError, RunnerResult};
pub use orchestrator::Orchestrator;
pub use report::{
    AfterMigrateOutcome, AppliedMigration, FailedScript, InfoReport, MigrateReport, PendingScript,
    Preview, ScriptRun, SeedReport,
};
pub use seed::SeedRunner;
pub use target::{open_target, Access, OpenedTarget, Target};
