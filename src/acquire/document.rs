//! Raw documents and acquisition attempts

use crate::error::SyncError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

/// Which acquisition path produced a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// High-level upstream client
    Primary,
    /// Isolated worker process
    Fallback,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Unparsed output of one acquisition attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub body: String,
    pub strategy: Strategy,
    pub fetched_at: DateTime<Utc>,
}

impl RawDocument {
    pub fn new(body: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            body: body.into(),
            strategy,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the body carries no data: blank, `[]`, `{}` or `null`
    pub fn is_empty(&self) -> bool {
        is_empty_body(&self.body)
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value, SyncError> {
        serde_json::from_str(&self.body)
            .map_err(|e| SyncError::malformed(format!("{} output", self.strategy), e))
    }
}

pub(crate) fn is_empty_body(body: &str) -> bool {
    matches!(body.trim(), "" | "[]" | "{}" | "null")
}

/// How a single attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Empty,
    Blocked,
    Error,
}

/// Diagnostic record of one strategy attempt
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionAttempt {
    pub strategy: Strategy,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}
