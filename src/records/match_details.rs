//! Match detail pages: result, veto sequence, maps and player statistics

use super::{ExtractedRecord, Record, lenient};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lifecycle state of a match as reported upstream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
    Postponed,
    Cancelled,
    #[default]
    Unknown,
}

impl MatchStatus {
    fn from_text(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "scheduled" | "upcoming" => Self::Scheduled,
            "live" => Self::Live,
            "finished" | "over" | "completed" => Self::Finished,
            "postponed" => Self::Postponed,
            "cancelled" | "canceled" | "deleted" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

impl<'de> Deserialize<'de> for MatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.as_deref().map(Self::from_text).unwrap_or_default())
    }
}

/// One step of the map veto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Veto {
    #[serde(default, deserialize_with = "lenient::number")]
    pub veto_order: Option<u32>,
    /// `removed`, `picked` or `leftover`, kept as reported
    #[serde(default, deserialize_with = "lenient::text")]
    pub veto_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub map_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResult {
    #[serde(default, deserialize_with = "lenient::text")]
    pub map_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_team1: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_team2: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub picked_by: Option<String>,
    /// Identifier of the map's statistics page, once played
    #[serde(default, deserialize_with = "lenient::number")]
    pub map_stats_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatLine {
    #[serde(default, deserialize_with = "lenient::number")]
    pub player_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub kills: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub deaths: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub adr: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub kast: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
}

/// Player lines of one team, in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatLines {
    pub team_name: String,
    #[serde(default, deserialize_with = "lenient::or_empty")]
    pub players: Vec<PlayerStatLine>,
}

/// Accepts the upstream `{team: [lines]}` object as well as the stored
/// `[{teamName, players}]` form, keeping team order either way
fn team_stat_lines<'de, D>(deserializer: D) -> Result<Vec<TeamStatLines>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LinesVisitor;

    impl<'de> Visitor<'de> for LinesVisitor {
        type Value = Vec<TeamStatLines>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("player stats keyed by team name")
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut teams = Vec::new();
            while let Some((team_name, players)) =
                map.next_entry::<String, Option<Vec<PlayerStatLine>>>()?
            {
                teams.push(TeamStatLines {
                    team_name,
                    players: players.unwrap_or_default(),
                });
            }
            Ok(teams)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut teams = Vec::new();
            while let Some(team) = seq.next_element()? {
                teams.push(team);
            }
            Ok(teams)
        }
    }

    deserializer.deserialize_any(LinesVisitor)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    #[serde(deserialize_with = "lenient::id")]
    pub match_id: u64,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default, deserialize_with = "lenient::number")]
    pub event_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team1_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team2_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_team1: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_team2: Option<u32>,
    /// Null unless both scores are known and differ
    #[serde(default, deserialize_with = "lenient::text")]
    pub winner: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_empty")]
    pub vetoes: Vec<Veto>,
    #[serde(default, deserialize_with = "lenient::or_empty")]
    pub maps: Vec<MapResult>,
    #[serde(default, deserialize_with = "team_stat_lines")]
    pub player_stats: Vec<TeamStatLines>,
}

impl MatchDetails {
    /// Player lines of the named team
    pub fn team_lines(&self, team_name: &str) -> Option<&[PlayerStatLine]> {
        self.player_stats
            .iter()
            .find(|t| t.team_name == team_name)
            .map(|t| t.players.as_slice())
    }

    /// Map statistics pages referenced by this match, in map order
    pub fn map_stats_ids(&self) -> Vec<u64> {
        self.maps.iter().filter_map(|m| m.map_stats_id).collect()
    }

    fn decided_winner(&self) -> Option<String> {
        match (self.score_team1, self.score_team2) {
            (Some(a), Some(b)) if a != b => self.winner.clone().or_else(|| {
                if a > b {
                    self.team1_name.clone()
                } else {
                    self.team2_name.clone()
                }
            }),
            _ => None,
        }
    }
}

impl Record for MatchDetails {
    const DOMAIN: super::Domain = super::Domain::Match;

    fn key(&self) -> String {
        self.match_id.to_string()
    }

    fn normalize(mut self) -> Self {
        // Stable: steps without an order keep their source position at the end
        self.vetoes
            .sort_by_key(|v| (v.veto_order.is_none(), v.veto_order));
        self.winner = self.decided_winner();
        self
    }

    fn into_extracted(self) -> ExtractedRecord {
        ExtractedRecord::MatchDetails(self)
    }
}
