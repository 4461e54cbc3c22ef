//! Team ranking table rows

use super::{ExtractedRecord, Record, lenient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRanking {
    #[serde(deserialize_with = "lenient::id")]
    pub team_id: u64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub points: Option<u32>,
    /// Places gained (positive) or lost since the previous ranking
    #[serde(default, deserialize_with = "lenient::number")]
    pub change: Option<i32>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_new: Option<bool>,
}

impl Record for TeamRanking {
    const DOMAIN: super::Domain = super::Domain::Rankings;

    fn key(&self) -> String {
        self.team_id.to_string()
    }

    fn into_extracted(self) -> ExtractedRecord {
        ExtractedRecord::TeamRanking(self)
    }
}
