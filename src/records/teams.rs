//! Team detail pages

use super::{ExtractedRecord, Record, lenient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPlayer {
    #[serde(default, deserialize_with = "lenient::number")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetails {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub coach: Option<String>,
    /// Active roster in source order
    #[serde(default, deserialize_with = "lenient::or_empty")]
    pub players: Vec<TeamPlayer>,
}

impl Record for TeamDetails {
    const DOMAIN: super::Domain = super::Domain::Team;

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn into_extracted(self) -> ExtractedRecord {
        ExtractedRecord::TeamDetails(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roster_order_and_nulls() {
        let team: TeamDetails = serde_json::from_value(json!({
            "id": 9565,
            "name": "Vitality",
            "rank": null,
            "players": [
                {"id": 7322, "name": "apEX"},
                {"name": "ZywOo", "country": "France"},
                {"id": "11893", "name": "flameZ"}
            ]
        }))
        .unwrap();

        assert_eq!(team.rank, None);
        assert_eq!(team.coach, None);
        let names: Vec<_> = team.players.iter().filter_map(|p| p.name.as_deref()).collect();
        assert_eq!(names, vec!["apEX", "ZywOo", "flameZ"]);
        assert_eq!(team.players[1].id, None);
        assert_eq!(team.players[2].id, Some(11893));
    }

    #[test]
    fn test_null_roster() {
        let team: TeamDetails = serde_json::from_value(json!({"id": 1, "players": null})).unwrap();
        assert!(team.players.is_empty());
    }
}
