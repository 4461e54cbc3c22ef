//! Sync jobs: the run wrapper, the batch driver and the job catalog

mod batch;
mod catalog;
mod run;
mod runner;

pub use batch::{
    BatchDriver, BatchSummary, DEFAULT_CONCURRENCY, DEFAULT_MAX_CONSECUTIVE_FAILURES,
    ItemOutcome, MAX_CONCURRENCY,
};
pub use catalog::{DEFAULT_MATCH_LOOKBACK_HOURS, JobName, SyncContext};
pub use run::{JobReport, RunState, SyncJobRun};
pub use runner::{DEFAULT_JOB_MAX_DURATION, JobFailed, JobHandle, SyncJobRunner};
