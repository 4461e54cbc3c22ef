//! SyncJobRun record and the report printed for schedulers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a job run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One invocation of a named job
///
/// Created when the job starts and finalised exactly once when it ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncJobRun {
    pub id: Uuid,
    pub name: String,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: usize,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl SyncJobRun {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            state: RunState::Running,
            started_at: Utc::now(),
            finished_at: None,
            items: 0,
            error: None,
            notes: Vec::new(),
        }
    }

    pub fn succeed(&mut self, items: usize) {
        self.items = items;
        self.state = RunState::Succeeded;
        self.finished_at = Some(Utc::now());
    }

    /// Mark failed; `items` is whatever was persisted before the failure
    pub fn fail(&mut self, error: impl Into<String>, items: usize) {
        self.items = items;
        self.error = Some(error.into());
        self.state = RunState::Failed;
        self.finished_at = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        self.state != RunState::Running
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    pub fn report(&self) -> JobReport {
        JobReport {
            name: self.name.clone(),
            run_id: self.id,
            state: self.state,
            items: self.items,
            duration_ms: self.duration_ms(),
            error: self.error.clone(),
        }
    }
}

/// Structured outcome handed back to the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub name: String,
    pub run_id: Uuid,
    pub state: RunState,
    pub items: usize,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut run = SyncJobRun::start("rankings");
        assert_eq!(run.state, RunState::Running);
        assert!(!run.is_finished());
        assert_eq!(run.duration_ms(), None);

        run.succeed(30);
        assert!(run.is_finished());
        assert_eq!(run.items, 30);
        assert!(run.duration_ms().unwrap() >= 0);
        assert!(run.report().succeeded());
    }

    #[test]
    fn test_failed_report_json() {
        let mut run = SyncJobRun::start("match-details");
        run.fail("no item succeeded", 0);

        let json = serde_json::to_value(run.report()).unwrap();
        assert_eq!(json["name"], "match-details");
        assert_eq!(json["state"], "failed");
        assert_eq!(json["items"], 0);
        assert_eq!(json["error"], "no item succeeded");
        assert_eq!(json["runId"], run.id.to_string());
        assert!(json["durationMs"].is_number());
    }
}
