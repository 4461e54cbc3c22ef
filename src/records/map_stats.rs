//! Per-map statistics pages

use super::{ExtractedRecord, Record, lenient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPlayerStats {
    #[serde(default, deserialize_with = "lenient::number")]
    pub player_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub kills: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub deaths: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub assists: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub adr: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub kast: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStats {
    #[serde(deserialize_with = "lenient::id")]
    pub map_stats_id: u64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub match_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub map_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team1_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team2_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_team1: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_team2: Option<u32>,
    /// Scoreboard lines for both teams, in source order
    #[serde(default, deserialize_with = "lenient::or_empty")]
    pub players: Vec<MapPlayerStats>,
}

impl Record for MapStats {
    const DOMAIN: super::Domain = super::Domain::MapStats;

    fn key(&self) -> String {
        self.map_stats_id.to_string()
    }

    fn into_extracted(self) -> ExtractedRecord {
        ExtractedRecord::MapStats(self)
    }
}
