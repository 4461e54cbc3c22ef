//! File system storage
//!
//! - [`RecordStore`]: upsert-by-key JSON records, one directory per domain
//! - [`RunLog`]: append-only job run records
//! - [`SyncManifest`]: extra entities tracked by detail jobs

mod manifest;
mod records;
mod runs;

pub use manifest::SyncManifest;
pub use records::RecordStore;
pub use runs::{NdjsonRunLog, RUN_LOG_FILE, RunLog};
