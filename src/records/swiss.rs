//! Swiss-stage bracket rounds

use super::{ExtractedRecord, Record, lenient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissPairing {
    #[serde(default, deserialize_with = "lenient::number")]
    pub match_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team1_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team2_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_team1: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_team2: Option<u32>,
    /// Win-loss pool the pairing was drawn from, e.g. `"1-0"`
    #[serde(default, deserialize_with = "lenient::text")]
    pub pool: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissRound {
    #[serde(deserialize_with = "lenient::id")]
    pub event_id: u64,
    #[serde(deserialize_with = "lenient::id")]
    pub round_number: u64,
    #[serde(default, deserialize_with = "lenient::or_empty")]
    pub matches: Vec<SwissPairing>,
}

impl Record for SwissRound {
    const DOMAIN: super::Domain = super::Domain::Swiss;

    fn key(&self) -> String {
        format!("{}-{}", self.event_id, self.round_number)
    }

    fn order(records: &mut [Self]) {
        records.sort_by_key(|r| r.round_number);
    }

    fn into_extracted(self) -> ExtractedRecord {
        ExtractedRecord::SwissRound(self)
    }
}
