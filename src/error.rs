//! Error taxonomy for acquisition and job execution
//!
//! "Not found" is deliberately absent here: an entity that does not exist
//! upstream is reported as `Ok(None)` (or [`ItemOutcome::NotFound`]) so that
//! callers can never confuse it with a failure.
//!
//! [`ItemOutcome::NotFound`]: crate::jobs::ItemOutcome::NotFound

use std::time::Duration;
use thiserror::Error;

/// Failure class used for logging and batch abort decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Primary client hit an anti-automation defense
    Blocked,
    /// Blocked on primary and the fallback also failed
    Unavailable,
    /// The worker process explicitly reported a failure
    Worker,
    /// Spawn, timeout, malformed output, network or parse failures
    Infrastructure,
    /// Handing the record to the store failed
    Persist,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Blocked => "blocked",
            Self::Unavailable => "unavailable",
            Self::Worker => "worker",
            Self::Infrastructure => "infrastructure",
            Self::Persist => "persist",
        };
        write!(f, "{}", name)
    }
}

/// Per-item acquisition and extraction errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// Primary strategy detected an anti-automation signal
    #[error("blocked by upstream: {0}")]
    Blocked(String),

    /// Primary was blocked and the fallback could not deliver either
    #[error("upstream unavailable (primary: {blocked}; fallback: {fallback})")]
    Unavailable {
        blocked: String,
        fallback: Box<SyncError>,
    },

    /// The worker process signaled an error on its error channel
    #[error("worker error: {0}")]
    Worker(String),

    /// Transport-level failure unrelated to anti-bot defenses
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// Worker process exceeded its time budget and was killed
    #[error("worker timed out after {0:?}")]
    Timeout(Duration),

    /// The persistence collaborator rejected the record
    #[error("persist error: {0}")]
    Persist(String),
}

impl SyncError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Blocked(_) => ErrorClass::Blocked,
            Self::Unavailable { .. } => ErrorClass::Unavailable,
            Self::Worker(_) => ErrorClass::Worker,
            Self::Infrastructure(_) | Self::Timeout(_) => ErrorClass::Infrastructure,
            Self::Persist(_) => ErrorClass::Persist,
        }
    }

    /// Whether this failure counts toward the consecutive-failure abort policy
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Infrastructure | ErrorClass::Unavailable
        )
    }

    pub(crate) fn malformed(what: impl std::fmt::Display, detail: impl std::fmt::Display) -> Self {
        Self::Infrastructure(format!("malformed {}: {}", what, detail))
    }
}

/// Errors raised by the job layer itself
#[derive(Debug, Error)]
pub enum JobError {
    /// Bookkeeping failure unrelated to extraction
    #[error("job bookkeeping failed: {0}")]
    Fatal(String),

    /// Every attempted item failed
    #[error("batch had no successes: {failed} of {total} item(s) failed, first error: {first_error}")]
    NoSuccesses {
        total: usize,
        failed: usize,
        first_error: String,
    },

    /// The invocation exceeded its maximum duration
    #[error("job exceeded maximum duration of {0:?}")]
    TimedOut(Duration),

    /// Too many consecutive infrastructure failures
    #[error("batch aborted after {consecutive} consecutive infrastructure failures ({synced} synced), last error: {last_error}")]
    Aborted {
        consecutive: u32,
        synced: usize,
        last_error: String,
    },
}

impl JobError {
    /// Items persisted before the job failed
    pub fn items_synced(&self) -> usize {
        match self {
            Self::Aborted { synced, .. } => *synced,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        assert_eq!(SyncError::Blocked("403".into()).class(), ErrorClass::Blocked);
        assert_eq!(
            SyncError::Timeout(Duration::from_secs(1)).class(),
            ErrorClass::Infrastructure
        );
        assert_eq!(SyncError::Worker("x".into()).class(), ErrorClass::Worker);
        assert_eq!(SyncError::Persist("x".into()).class(), ErrorClass::Persist);
    }

    #[test]
    fn test_infrastructure_streak_members() {
        assert!(SyncError::Infrastructure("spawn".into()).is_infrastructure());
        assert!(SyncError::Timeout(Duration::from_secs(5)).is_infrastructure());
        assert!(
            SyncError::Unavailable {
                blocked: "403".into(),
                fallback: Box::new(SyncError::Infrastructure("exit 1".into())),
            }
            .is_infrastructure()
        );
        assert!(!SyncError::Worker("Match not found".into()).is_infrastructure());
        assert!(!SyncError::Persist("disk full".into()).is_infrastructure());
    }

    #[test]
    fn test_display() {
        let err = SyncError::Timeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "worker timed out after 300s");
        let err = SyncError::Timeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "worker timed out after 500ms");
        let err = JobError::TimedOut(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "job exceeded maximum duration of 1.5s");
        let err = SyncError::malformed("worker output", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "infrastructure error: malformed worker output: expected value at line 1"
        );
    }
}
