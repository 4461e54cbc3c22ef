//! Acquisition strategy selection
//!
//! One logical fetch is a two-state machine: `Primary` then, only on a
//! blocking signal (or a suspiciously empty listing), `Fallback`. There is
//! no retry loop; each call makes at most one attempt per strategy.

use super::document::{AcquisitionAttempt, AttemptOutcome, RawDocument, Strategy, is_empty_body};
use super::signal::is_blocking_signal;
use crate::bridge::WorkerBridge;
use crate::client::{PrimaryClient, UpstreamClient};
use crate::error::SyncError;
use crate::records::Domain;
use std::time::Instant;

/// Result of one logical fetch plus the attempts that produced it
#[derive(Debug)]
pub struct Acquisition {
    /// `Ok(None)` means the entity does not exist upstream
    pub result: Result<Option<RawDocument>, SyncError>,
    pub attempts: Vec<AcquisitionAttempt>,
}

impl Acquisition {
    pub fn into_result(self) -> Result<Option<RawDocument>, SyncError> {
        self.result
    }

    pub fn used_fallback(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.strategy == Strategy::Fallback)
    }
}

enum PrimaryStep {
    Done(Result<Option<RawDocument>, SyncError>),
    FallBack(String),
}

/// Chooses between the primary client and the worker-process fallback
pub struct Acquirer<P = UpstreamClient> {
    primary: Option<P>,
    fallback: Option<WorkerBridge>,
}

impl<P: PrimaryClient> Acquirer<P> {
    /// Create an acquirer from the available strategies
    ///
    /// # Errors
    /// Returns an error if neither strategy is configured
    pub fn new(primary: Option<P>, fallback: Option<WorkerBridge>) -> eyre::Result<Self> {
        if primary.is_none() && fallback.is_none() {
            eyre::bail!("No acquisition strategy configured: set UPSTREAM_URL or WORKER_PROGRAM");
        }
        Ok(Self { primary, fallback })
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Fetch one document for `domain`, identified by `ids`
    pub async fn acquire(&self, domain: Domain, ids: &[&str]) -> Acquisition {
        let mut attempts = Vec::with_capacity(2);

        let blocked = match &self.primary {
            Some(primary) => match Self::try_primary(primary, domain, ids, &mut attempts).await {
                PrimaryStep::Done(result) => return Acquisition { result, attempts },
                PrimaryStep::FallBack(reason) => Some(reason),
            },
            None => None,
        };

        let Some(fallback) = &self.fallback else {
            let reason = blocked.unwrap_or_else(|| "no strategy available".to_string());
            return Acquisition {
                result: Err(SyncError::Blocked(reason)),
                attempts,
            };
        };

        let started = Instant::now();
        let result = fallback.run(domain, ids).await;
        let outcome = match &result {
            Ok(Some(_)) => AttemptOutcome::Success,
            Ok(None) => AttemptOutcome::Empty,
            Err(_) => AttemptOutcome::Error,
        };
        record(&mut attempts, Strategy::Fallback, outcome, started);

        let result = match (result, blocked) {
            (Err(e), Some(blocked)) => Err(SyncError::Unavailable {
                blocked,
                fallback: Box::new(e),
            }),
            (result, _) => result,
        };
        Acquisition { result, attempts }
    }

    async fn try_primary(
        primary: &P,
        domain: Domain,
        ids: &[&str],
        attempts: &mut Vec<AcquisitionAttempt>,
    ) -> PrimaryStep {
        let started = Instant::now();
        match primary.fetch(domain, ids).await {
            Ok(Some(body)) if !is_empty_body(&body) => {
                record(attempts, Strategy::Primary, AttemptOutcome::Success, started);
                PrimaryStep::Done(Ok(Some(RawDocument::new(body, Strategy::Primary))))
            }
            Ok(_) => {
                record(attempts, Strategy::Primary, AttemptOutcome::Empty, started);
                if domain.is_block_sensitive() {
                    log::warn!(
                        "Primary returned an empty {} listing, switching to fallback",
                        domain
                    );
                    PrimaryStep::FallBack(format!("empty {} listing from primary", domain))
                } else {
                    PrimaryStep::Done(Ok(None))
                }
            }
            Err(e) => {
                let text = format!("{:#}", e);
                if is_blocking_signal(&text) {
                    record(attempts, Strategy::Primary, AttemptOutcome::Blocked, started);
                    log::warn!("Primary blocked on {} ({}), switching to fallback", domain, text);
                    PrimaryStep::FallBack(text)
                } else {
                    record(attempts, Strategy::Primary, AttemptOutcome::Error, started);
                    PrimaryStep::Done(Err(SyncError::Infrastructure(text)))
                }
            }
        }
    }
}

fn record(
    attempts: &mut Vec<AcquisitionAttempt>,
    strategy: Strategy,
    outcome: AttemptOutcome,
    started: Instant,
) {
    let attempt = AcquisitionAttempt {
        strategy,
        outcome,
        elapsed: started.elapsed(),
    };
    log::debug!(
        "{} attempt finished: {:?} in {}ms",
        attempt.strategy,
        attempt.outcome,
        attempt.elapsed.as_millis()
    );
    attempts.push(attempt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedPrimary {
        response: Result<Option<String>, String>,
        calls: AtomicUsize,
    }

    impl ScriptedPrimary {
        fn new(response: Result<Option<&str>, &str>) -> Self {
            Self {
                response: response.map(|b| b.map(str::to_string)).map_err(str::to_string),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PrimaryClient for ScriptedPrimary {
        async fn fetch(&self, _domain: Domain, _ids: &[&str]) -> eyre::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().map_err(|e| eyre::eyre!(e))
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let acquirer =
            Acquirer::new(Some(ScriptedPrimary::new(Ok(Some(r#"[{"teamId":1}]"#)))), None).unwrap();
        let acquisition = acquirer.acquire(Domain::Rankings, &[]).await;

        assert!(!acquisition.used_fallback());
        let doc = acquisition.into_result().unwrap().unwrap();
        assert_eq!(doc.strategy, Strategy::Primary);
    }

    #[tokio::test]
    async fn test_ordinary_error_does_not_fall_back() {
        let primary = ScriptedPrimary::new(Err("connection reset by peer"));
        let acquirer = Acquirer::new(Some(primary), None).unwrap();
        let acquisition = acquirer.acquire(Domain::Match, &["1"]).await;

        assert_eq!(acquisition.attempts.len(), 1);
        assert_eq!(acquisition.attempts[0].outcome, AttemptOutcome::Error);
        assert!(matches!(
            acquisition.result,
            Err(SyncError::Infrastructure(ref msg)) if msg.contains("connection reset")
        ));
    }

    #[tokio::test]
    async fn test_blocked_without_fallback_is_blocked() {
        let primary = ScriptedPrimary::new(Err("Request failed: 403 Forbidden"));
        let acquirer = Acquirer::new(Some(primary), None).unwrap();
        let acquisition = acquirer.acquire(Domain::Team, &["9565"]).await;

        assert_eq!(acquisition.attempts[0].outcome, AttemptOutcome::Blocked);
        assert!(matches!(acquisition.result, Err(SyncError::Blocked(_))));
        assert_eq!(acquirer.primary.as_ref().unwrap().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_detail_is_not_found() {
        let primary = ScriptedPrimary::new(Ok(None));
        let acquirer = Acquirer::new(Some(primary), None).unwrap();
        let acquisition = acquirer.acquire(Domain::Match, &["404"]).await;

        assert!(!acquisition.used_fallback());
        assert!(acquisition.into_result().unwrap().is_none());
    }

    #[cfg(unix)]
    fn sh_worker(dir: &std::path::Path, domain: Domain, body: &str) -> WorkerBridge {
        let script = dir.join(format!("{}.sh", domain.slug()));
        std::fs::write(script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        WorkerBridge::new("sh", dir).with_extension("sh")
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_blocked_and_failed_fallback_is_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let bridge = sh_worker(
            dir.path(),
            Domain::Team,
            "echo 'Error: layout changed' >&2; exit 1",
        );
        let primary = ScriptedPrimary::new(Err("Request failed: 403 Forbidden"));
        let acquirer = Acquirer::new(Some(primary), Some(bridge)).unwrap();
        let acquisition = acquirer.acquire(Domain::Team, &["9565"]).await;

        let outcomes: Vec<_> = acquisition
            .attempts
            .iter()
            .map(|a| (a.strategy, a.outcome))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                (Strategy::Primary, AttemptOutcome::Blocked),
                (Strategy::Fallback, AttemptOutcome::Error),
            ]
        );

        let err = acquisition.into_result().unwrap_err();
        assert!(err.is_infrastructure());
        match err {
            SyncError::Unavailable { blocked, fallback } => {
                assert!(blocked.contains("403"));
                assert!(matches!(*fallback, SyncError::Worker(ref m) if m == "layout changed"));
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }
        assert_eq!(acquirer.primary.as_ref().unwrap().calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_listing_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let bridge = sh_worker(dir.path(), Domain::Matches, r#"echo '[{"id": 1}]'"#);
        let acquirer = Acquirer::new(Some(ScriptedPrimary::new(Ok(Some("[]")))), Some(bridge)).unwrap();
        let acquisition = acquirer.acquire(Domain::Matches, &[]).await;

        let outcomes: Vec<_> = acquisition
            .attempts
            .iter()
            .map(|a| (a.strategy, a.outcome))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                (Strategy::Primary, AttemptOutcome::Empty),
                (Strategy::Fallback, AttemptOutcome::Success),
            ]
        );
        let doc = acquisition.into_result().unwrap().unwrap();
        assert_eq!(doc.strategy, Strategy::Fallback);
    }

    #[test]
    fn test_requires_a_strategy() {
        assert!(Acquirer::<ScriptedPrimary>::new(None, None).is_err());
    }
}
