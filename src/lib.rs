//! Esports Sync
//!
//! Acquires competition data (matches, events, rankings, lineups, map
//! statistics, swiss rounds) from an anti-automation protected upstream and
//! keeps a local record store in step on a recurring schedule.

pub mod acquire;
pub mod bridge;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod jobs;
pub mod records;
pub mod storage;

// Re-exports for convenience
pub use acquire::{Acquirer, RawDocument, Strategy, is_blocking_signal};
pub use bridge::WorkerBridge;
pub use client::{Auth, AuthType, PrimaryClient, UpstreamClient};
pub use config::SyncConfig;
pub use error::{JobError, SyncError};
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use jobs::{BatchDriver, ItemOutcome, JobName, JobReport, SyncContext, SyncJobRunner};
pub use records::{Domain, ExtractedRecord, Record};
pub use storage::{NdjsonRunLog, RecordStore, RunLog, SyncManifest};
