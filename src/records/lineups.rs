//! Event participant rosters

use super::{ExtractedRecord, Record, lenient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupPlayer {
    #[serde(default, deserialize_with = "lenient::number")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLineup {
    #[serde(default, deserialize_with = "lenient::number")]
    pub team_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub seed: Option<u32>,
    #[serde(default, deserialize_with = "lenient::or_empty")]
    pub players: Vec<LineupPlayer>,
}

/// All announced rosters of one event, in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLineups {
    #[serde(deserialize_with = "lenient::id")]
    pub event_id: u64,
    #[serde(default, deserialize_with = "lenient::or_empty")]
    pub teams: Vec<TeamLineup>,
}

impl EventLineups {
    pub fn player_count(&self) -> usize {
        self.teams.iter().map(|t| t.players.len()).sum()
    }
}

impl Record for EventLineups {
    const DOMAIN: super::Domain = super::Domain::EventLineups;

    fn key(&self) -> String {
        self.event_id.to_string()
    }

    fn into_extracted(self) -> ExtractedRecord {
        ExtractedRecord::EventLineups(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lineups_preserve_order() {
        let lineups: EventLineups = serde_json::from_value(json!({
            "eventId": "7148",
            "teams": [
                {"teamId": 4608, "teamName": "NAVI", "seed": 2,
                 "players": [{"name": "b1t"}, {"name": "iM"}, {"name": "jL"}]},
                {"teamName": "TBD", "players": null}
            ]
        }))
        .unwrap();

        assert_eq!(lineups.event_id, 7148);
        assert_eq!(lineups.teams.len(), 2);
        assert_eq!(lineups.teams[1].team_id, None);
        assert_eq!(lineups.teams[1].seed, None);
        assert_eq!(lineups.player_count(), 3);
        assert_eq!(lineups.teams[0].players[2].name.as_deref(), Some("jL"));
    }
}
