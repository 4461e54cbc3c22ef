//! Sync job wrapper: one run record per invocation

use super::run::{JobReport, SyncJobRun};
use crate::error::JobError;
use crate::storage::RunLog;
use owo_colors::OwoColorize;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Default ceiling for one job invocation
pub const DEFAULT_JOB_MAX_DURATION: Duration = Duration::from_secs(600);

/// Handle passed to a job body for progress and error notes
#[derive(Debug, Clone)]
pub struct JobHandle {
    run_id: Uuid,
    notes: Arc<Mutex<Vec<String>>>,
}

impl JobHandle {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            notes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle not tied to a recorded run, for invoking job bodies directly
    pub fn detached() -> Self {
        Self::new(Uuid::nil())
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Append a note to the run record
    pub fn note(&self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("[{}] {}", self.run_id, text);
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text);
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A job failed; its run record was finalised before this was returned
#[derive(Debug, Error)]
#[error("job {} failed: {cause:#}", report.name)]
pub struct JobFailed {
    pub report: JobReport,
    pub cause: eyre::Report,
}

/// Wraps job bodies with run-record bookkeeping and a duration ceiling
///
/// The wrapper never retries; a failed job is simply invoked again on the
/// scheduler's next tick.
pub struct SyncJobRunner<L> {
    log: L,
    max_duration: Duration,
}

impl<L: RunLog> SyncJobRunner<L> {
    pub fn new(log: L) -> Self {
        Self {
            log,
            max_duration: DEFAULT_JOB_MAX_DURATION,
        }
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Run `body` as the named job
    ///
    /// The body's return value is the job's item count. If the body does not
    /// finish within the maximum duration it is dropped, which kills any
    /// worker processes it still has in flight.
    ///
    /// # Errors
    /// Returns [`JobFailed`] carrying the finalised report when the body
    /// fails, times out, or the run log cannot be written.
    pub async fn run_job<F, Fut>(&self, name: &str, body: F) -> Result<JobReport, JobFailed>
    where
        F: FnOnce(JobHandle) -> Fut,
        Fut: Future<Output = eyre::Result<usize>>,
    {
        let mut run = SyncJobRun::start(name);
        log::info!("Starting job {} (run {})", name.bold(), run.id);

        if let Err(e) = self.log.create(&run) {
            let cause = eyre::Report::new(JobError::Fatal(format!("{:#}", e)));
            run.fail(cause.to_string(), 0);
            log::error!("Job {} could not be recorded: {:#}", name.bold(), e);
            return Err(JobFailed {
                report: run.report(),
                cause,
            });
        }

        let handle = JobHandle::new(run.id);
        let outcome = match tokio::time::timeout(self.max_duration, body(handle.clone())).await {
            Ok(result) => result,
            Err(_) => Err(JobError::TimedOut(self.max_duration).into()),
        };
        run.notes = handle.notes();

        match &outcome {
            Ok(items) => run.succeed(*items),
            Err(e) => {
                let synced = e.downcast_ref::<JobError>().map_or(0, JobError::items_synced);
                run.fail(format!("{:#}", e), synced);
            }
        }

        if let Err(e) = self.log.finish(&run) {
            let cause = eyre::Report::new(JobError::Fatal(format!("{:#}", e)));
            log::error!("Job {} could not be finalised: {:#}", name.bold(), e);
            if outcome.is_ok() {
                let items = run.items;
                run.fail(cause.to_string(), items);
            }
            return Err(JobFailed {
                report: run.report(),
                cause,
            });
        }

        match outcome {
            Ok(items) => {
                log::info!(
                    "Job {} succeeded: {} item(s) in {}ms",
                    name.bold(),
                    items.green(),
                    run.duration_ms().unwrap_or_default()
                );
                Ok(run.report())
            }
            Err(cause) => {
                log::error!("Job {} failed: {:#}", name.bold(), cause);
                Err(JobFailed {
                    report: run.report(),
                    cause,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::RunState;
    use eyre::eyre;

    #[derive(Default)]
    struct MemoryLog {
        lines: Mutex<Vec<SyncJobRun>>,
        fail_create: bool,
    }

    impl RunLog for MemoryLog {
        fn create(&self, run: &SyncJobRun) -> eyre::Result<()> {
            if self.fail_create {
                eyre::bail!("disk full");
            }
            self.lines.lock().unwrap().push(run.clone());
            Ok(())
        }

        fn finish(&self, run: &SyncJobRun) -> eyre::Result<()> {
            self.lines.lock().unwrap().push(run.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_success_records_count_and_notes() {
        let runner = SyncJobRunner::new(MemoryLog::default());

        let report = runner
            .run_job("rankings", |handle| async move {
                handle.note("fetched listing");
                Ok(30)
            })
            .await
            .unwrap();

        assert_eq!(report.state, RunState::Succeeded);
        assert_eq!(report.items, 30);
        assert_eq!(report.error, None);

        let lines = runner.log().lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].state, RunState::Running);
        assert_eq!(lines[1].notes, vec!["fetched listing".to_string()]);
        assert_eq!(lines[0].id, lines[1].id);
    }

    #[tokio::test]
    async fn test_failure_is_finalised_then_returned() {
        let runner = SyncJobRunner::new(MemoryLog::default());

        let failed = runner
            .run_job("events", |_| async { Err::<usize, _>(eyre!("listing unparsable")) })
            .await
            .unwrap_err();

        assert_eq!(failed.report.state, RunState::Failed);
        assert_eq!(failed.report.error.as_deref(), Some("listing unparsable"));

        let lines = runner.log().lines.lock().unwrap();
        assert_eq!(lines.last().unwrap().state, RunState::Failed);
        assert!(lines.last().unwrap().finished_at.is_some());
    }

    #[tokio::test]
    async fn test_timeout_fails_run() {
        let runner =
            SyncJobRunner::new(MemoryLog::default()).with_max_duration(Duration::from_millis(20));

        let failed = runner
            .run_job("match-details", |_| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            })
            .await
            .unwrap_err();

        assert!(matches!(
            failed.cause.downcast_ref::<JobError>(),
            Some(JobError::TimedOut(_))
        ));
        assert_eq!(failed.report.state, RunState::Failed);
    }

    #[tokio::test]
    async fn test_aborted_batch_keeps_partial_count() {
        let runner = SyncJobRunner::new(MemoryLog::default());

        let failed = runner
            .run_job("map-stats", |_| async {
                Err::<usize, _>(
                    JobError::Aborted {
                        consecutive: 5,
                        synced: 2,
                        last_error: "spawn failed".into(),
                    }
                    .into(),
                )
            })
            .await
            .unwrap_err();

        assert_eq!(failed.report.items, 2);
    }

    #[tokio::test]
    async fn test_log_failure_is_fatal() {
        let runner = SyncJobRunner::new(MemoryLog {
            fail_create: true,
            ..Default::default()
        });

        let mut invoked = false;
        let failed = runner
            .run_job("matches", |_| {
                invoked = true;
                async { Ok(1) }
            })
            .await
            .unwrap_err();

        assert!(!invoked);
        assert!(matches!(
            failed.cause.downcast_ref::<JobError>(),
            Some(JobError::Fatal(_))
        ));
    }
}
