//! Append-only job run log

use crate::jobs::SyncJobRun;
use eyre::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the run log inside the data directory
pub const RUN_LOG_FILE: &str = "sync_runs.ndjson";

/// Destination for job run records
///
/// `create` is called once when a job starts; `finish` once with the
/// finalised record, whether the job succeeded or failed.
pub trait RunLog: Send + Sync {
    fn create(&self, run: &SyncJobRun) -> Result<()>;

    fn finish(&self, run: &SyncJobRun) -> Result<()>;
}

/// NDJSON run log, one line per state transition
#[derive(Debug, Clone)]
pub struct NdjsonRunLog {
    path: PathBuf,
}

impl NdjsonRunLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Run log at `<data_dir>/sync_runs.ndjson`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(RUN_LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, run: &SyncJobRun) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open run log: {}", self.path.display()))?;

        writeln!(file, "{}", serde_json::to_string(run)?)
            .with_context(|| format!("Failed to append to run log: {}", self.path.display()))?;
        Ok(())
    }

    /// Latest state of every run, oldest first
    pub fn read(&self) -> Result<Vec<SyncJobRun>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read run log: {}", self.path.display()))?;

        let mut runs: Vec<SyncJobRun> = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let run: SyncJobRun = serde_json::from_str(line).with_context(|| {
                format!("Failed to parse run log line {}: {}", number + 1, self.path.display())
            })?;
            match runs.iter_mut().find(|r| r.id == run.id) {
                Some(existing) => *existing = run,
                None => runs.push(run),
            }
        }
        Ok(runs)
    }

    /// The `limit` most recently started runs, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<SyncJobRun>> {
        let mut runs = self.read()?;
        runs.reverse();
        runs.truncate(limit);
        Ok(runs)
    }
}

impl RunLog for NdjsonRunLog {
    fn create(&self, run: &SyncJobRun) -> Result<()> {
        self.append(run)
    }

    fn finish(&self, run: &SyncJobRun) -> Result<()> {
        self.append(run)
    }
}
