//! Batch driver with bounded concurrency and per-item failure isolation

use crate::error::{JobError, SyncError};
use futures::stream::{self, StreamExt};
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::future::Future;

pub const DEFAULT_CONCURRENCY: usize = 3;

/// Upper bound on in-flight items; the upstream reacts to bursts
pub const MAX_CONCURRENCY: usize = 9;

pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Successful per-item result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Record extracted and persisted
    Synced,
    /// The entity does not exist upstream; skip until the next tick
    NotFound,
}

/// Tally of one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub synced: usize,
    pub not_found: usize,
    pub failed: usize,
    pub first_error: Option<String>,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} item(s): {} synced, {} not found, {} failed",
            self.total, self.synced, self.not_found, self.failed
        )
    }
}

/// Runs a per-item function over a worklist
///
/// At most `concurrency` items are in flight; the rest wait for a slot.
/// A failed item is logged and skipped. The batch aborts early only when
/// `max_consecutive_failures` infrastructure-class failures complete in a
/// row (0 disables the check).
#[derive(Debug, Clone)]
pub struct BatchDriver {
    concurrency: usize,
    max_consecutive_failures: u32,
}

impl Default for BatchDriver {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl BatchDriver {
    /// Create a driver; `concurrency` is clamped to `1..=MAX_CONCURRENCY`
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }

    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = max;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn max_consecutive_failures(&self) -> u32 {
        self.max_consecutive_failures
    }

    /// Process every item with `work`
    ///
    /// # Errors
    /// - [`JobError::Aborted`] when the consecutive-failure limit is hit;
    ///   items still in flight are dropped
    /// - [`JobError::NoSuccesses`] when at least one item failed and none
    ///   was synced
    pub async fn run<I, F, Fut>(&self, items: Vec<I>, work: F) -> Result<BatchSummary, JobError>
    where
        I: Display,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<ItemOutcome, SyncError>>,
    {
        let mut summary = BatchSummary {
            total: items.len(),
            ..Default::default()
        };
        let mut streak = 0u32;

        let mut results = std::pin::pin!(
            stream::iter(items)
                .map(|item| {
                    let label = item.to_string();
                    let pending = work(item);
                    async move { (label, pending.await) }
                })
                .buffer_unordered(self.concurrency)
        );

        while let Some((label, result)) = results.next().await {
            match result {
                Ok(ItemOutcome::Synced) => {
                    summary.synced += 1;
                    streak = 0;
                }
                Ok(ItemOutcome::NotFound) => {
                    summary.not_found += 1;
                    streak = 0;
                    log::info!("{} not found upstream, skipped", label.cyan());
                }
                Err(error) => {
                    summary.failed += 1;
                    log::warn!(
                        "Skipping {} after {} failure: {}",
                        label.cyan(),
                        error.class(),
                        error
                    );
                    if summary.first_error.is_none() {
                        summary.first_error = Some(error.to_string());
                    }

                    if !error.is_infrastructure() {
                        streak = 0;
                        continue;
                    }
                    streak += 1;
                    if self.max_consecutive_failures > 0 && streak >= self.max_consecutive_failures {
                        log::error!(
                            "Aborting batch after {} consecutive infrastructure failures ({})",
                            streak.red(),
                            summary
                        );
                        return Err(JobError::Aborted {
                            consecutive: streak,
                            synced: summary.synced,
                            last_error: error.to_string(),
                        });
                    }
                }
            }
        }

        if summary.failed > 0 && summary.synced == 0 {
            return Err(JobError::NoSuccesses {
                total: summary.total,
                failed: summary.failed,
                first_error: summary.first_error.unwrap_or_default(),
            });
        }

        log::info!("Batch complete: {}", summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn infra(id: u64) -> SyncError {
        SyncError::Infrastructure(format!("spawn failed for {}", id))
    }

    #[test]
    fn test_concurrency_clamped() {
        assert_eq!(BatchDriver::new(0).concurrency(), 1);
        assert_eq!(BatchDriver::new(50).concurrency(), MAX_CONCURRENCY);
        assert_eq!(BatchDriver::default().concurrency(), DEFAULT_CONCURRENCY);
    }

    #[tokio::test]
    async fn test_failures_are_skipped() {
        let driver = BatchDriver::new(3);
        let items: Vec<u64> = (1..=10).collect();

        let summary = driver
            .run(items, |id| async move {
                match id % 4 {
                    0 => Err(SyncError::Worker(format!("Match {} not found on page", id))),
                    1 => Ok(ItemOutcome::NotFound),
                    _ => Ok(ItemOutcome::Synced),
                }
            })
            .await
            .unwrap();

        assert_eq!(summary.total, 10);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.not_found, 3);
        assert_eq!(summary.synced, 5);
    }

    #[tokio::test]
    async fn test_no_successes_is_error() {
        let driver = BatchDriver::new(2).with_max_consecutive_failures(0);

        let error = driver
            .run(vec![1u64, 2, 3], |id| async move { Err::<ItemOutcome, _>(infra(id)) })
            .await
            .unwrap_err();

        match error {
            JobError::NoSuccesses { total, failed, first_error } => {
                assert_eq!(total, 3);
                assert_eq!(failed, 3);
                assert!(first_error.contains("spawn failed"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_and_all_not_found_succeed() {
        let driver = BatchDriver::default();

        let empty = driver
            .run(Vec::<u64>::new(), |_| async { Ok(ItemOutcome::Synced) })
            .await
            .unwrap();
        assert_eq!(empty.synced, 0);

        let missing = driver
            .run(vec![1u64, 2], |_| async { Ok(ItemOutcome::NotFound) })
            .await
            .unwrap();
        assert_eq!(missing.synced, 0);
        assert_eq!(missing.not_found, 2);
    }

    #[tokio::test]
    async fn test_consecutive_infrastructure_failures_abort() {
        let driver = BatchDriver::new(1).with_max_consecutive_failures(3);
        let started = AtomicUsize::new(0);

        let error = driver
            .run((1u64..=10).collect(), |id| {
                started.fetch_add(1, Ordering::SeqCst);
                async move {
                    if id == 1 {
                        Ok(ItemOutcome::Synced)
                    } else {
                        Err(SyncError::Timeout(Duration::from_secs(300)))
                    }
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            JobError::Aborted { consecutive: 3, synced: 1, .. }
        ));
        assert!(started.load(Ordering::SeqCst) < 10);
    }

    #[tokio::test]
    async fn test_worker_errors_reset_streak() {
        let driver = BatchDriver::new(1).with_max_consecutive_failures(2);

        let summary = driver
            .run((1u64..=6).collect(), |id| async move {
                match id {
                    6 => Ok(ItemOutcome::Synced),
                    n if n % 2 == 0 => Err(SyncError::Worker("Error: page changed".into())),
                    n => Err(infra(n)),
                }
            })
            .await
            .unwrap();

        assert_eq!(summary.failed, 5);
        assert_eq!(summary.synced, 1);
    }

    #[tokio::test]
    async fn test_bounded_in_flight() {
        let driver = BatchDriver::new(2);
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        driver
            .run((1u64..=8).collect(), |_| async {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(ItemOutcome::Synced)
            })
            .await
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
