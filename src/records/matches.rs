//! Match listing entries

use super::{ExtractedRecord, Record, lenient};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the upcoming/live match listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team1: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub team1_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team2: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub team2_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub event_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub stars: Option<u8>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub live: Option<bool>,
}

impl Match {
    /// Whether the match still needs detail syncing
    ///
    /// Live and undated matches are always pending; dated ones are pending
    /// from the moment they are announced until `lookback` after their start.
    pub fn is_pending(&self, now: DateTime<Utc>, lookback: Duration) -> bool {
        if self.live == Some(true) {
            return true;
        }
        match self.date {
            Some(date) => date >= now - lookback,
            None => true,
        }
    }
}

impl Record for Match {
    const DOMAIN: super::Domain = super::Domain::Matches;

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn into_extracted(self) -> ExtractedRecord {
        ExtractedRecord::Match(self)
    }
}
