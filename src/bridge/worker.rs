//! Worker process invocation and output classification

use crate::acquire::{RawDocument, Strategy, is_empty_body};
use crate::error::SyncError;
use crate::records::Domain;
use serde::de::IgnoredAny;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Prefix of a line on the worker's error channel that signals a failure
pub const ERROR_MARKER: &str = "Error:";

/// Default worker time budget; on the order of a whole job's budget
pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(300);

/// Longest stderr excerpt carried in infrastructure errors
const STDERR_EXCERPT: usize = 200;

/// Runs one isolated worker process per extraction call
///
/// Invocation is `<program> <script_dir>/<domain>.<extension> <ids...>`.
/// The worker writes one JSON document to stdout on success, or a line
/// starting with `Error:` to stderr on failure.
///
/// # Example
/// ```no_run
/// use esports_sync::bridge::WorkerBridge;
/// use esports_sync::records::Domain;
///
/// # async fn example() -> Result<(), esports_sync::error::SyncError> {
/// let bridge = WorkerBridge::new("node", "workers");
/// let document = bridge.run(Domain::Match, &["2371234"]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WorkerBridge {
    program: PathBuf,
    script_dir: PathBuf,
    extension: String,
    timeout: Duration,
}

impl WorkerBridge {
    pub fn new(program: impl Into<PathBuf>, script_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script_dir: script_dir.into(),
            extension: "js".to_string(),
            timeout: DEFAULT_WORKER_TIMEOUT,
        }
    }

    /// Set the worker script file extension (default: `js`)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the per-call time budget (default: 300s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Script that extracts `domain`
    pub fn script_path(&self, domain: Domain) -> PathBuf {
        self.script_dir
            .join(format!("{}.{}", domain.slug(), self.extension))
    }

    /// Run the worker for `domain` and classify its result
    ///
    /// Returns `Ok(None)` when the worker succeeds without data. A worker
    /// that outlives the time budget is killed and reported as
    /// [`SyncError::Timeout`].
    pub async fn run(&self, domain: Domain, ids: &[&str]) -> Result<Option<RawDocument>, SyncError> {
        let script = self.script_path(domain);
        log::debug!(
            "Spawning worker {} {} {}",
            self.program.display(),
            script.display(),
            ids.join(" ")
        );

        let child = Command::new(&self.program)
            .arg(&script)
            .args(ids)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SyncError::Infrastructure(format!(
                    "failed to spawn worker {} {}: {}",
                    self.program.display(),
                    script.display(),
                    e
                ))
            })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|e| {
                SyncError::Infrastructure(format!("failed to collect worker output: {}", e))
            })?,
            Err(_) => {
                log::warn!(
                    "Worker for {} {:?} exceeded {:?}, killed",
                    domain,
                    ids,
                    self.timeout
                );
                return Err(SyncError::Timeout(self.timeout));
            }
        };

        classify(domain, output)
    }
}

/// Message of the first stderr line carrying the error marker
pub fn worker_error(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .find_map(|line| line.strip_prefix(ERROR_MARKER))
        .map(|message| message.trim().to_string())
}

fn classify(domain: Domain, output: Output) -> Result<Option<RawDocument>, SyncError> {
    let stderr = String::from_utf8_lossy(&output.stderr);

    if let Some(message) = worker_error(&stderr) {
        return Err(SyncError::Worker(message));
    }

    if !output.status.success() {
        return Err(SyncError::Infrastructure(format!(
            "worker for {} exited with {}: {}",
            domain,
            output.status,
            excerpt(&stderr)
        )));
    }

    if !stderr.trim().is_empty() {
        log::debug!("Worker for {} wrote to stderr: {}", domain, excerpt(&stderr));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| SyncError::malformed("worker output", e))?;

    if is_empty_body(&stdout) {
        return Ok(None);
    }

    serde_json::from_str::<IgnoredAny>(&stdout)
        .map_err(|e| SyncError::malformed("worker output", e))?;

    Ok(Some(RawDocument::new(stdout, Strategy::Fallback)))
}

fn excerpt(stderr: &str) -> String {
    let last = stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("(no stderr)")
        .trim();
    last.chars().take(STDERR_EXCERPT).collect()
}
