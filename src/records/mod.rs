//! Typed records extracted from upstream documents
//!
//! Each data domain has its own record type. Fields the upstream source
//! does not structurally guarantee are `Option`s; identifiers taken from a
//! document's envelope are required and form the record's store key.

mod events;
pub mod lenient;
mod lineups;
mod map_stats;
mod match_details;
mod matches;
mod rankings;
mod swiss;
mod teams;

pub use events::{Event, EventPhase, MAJOR_KEYWORD, MAJOR_PRIZE_POOL_USD};
pub use lineups::{EventLineups, LineupPlayer, TeamLineup};
pub use map_stats::{MapPlayerStats, MapStats};
pub use match_details::{MapResult, MatchDetails, MatchStatus, PlayerStatLine, TeamStatLines, Veto};
pub use matches::Match;
pub use rankings::TeamRanking;
pub use swiss::{SwissPairing, SwissRound};
pub use teams::{TeamDetails, TeamPlayer};

use crate::acquire::RawDocument;
use crate::error::SyncError;
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream data domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Global listing of upcoming and live matches
    Matches,
    /// Global listing of events
    Events,
    /// Global team ranking table
    Rankings,
    /// Details for one team
    Team,
    /// Participating rosters of one event
    EventLineups,
    /// Details, vetoes and player stats for one match
    Match,
    /// Statistics for one played map
    MapStats,
    /// Swiss-stage rounds of one event
    Swiss,
}

impl Domain {
    pub const ALL: [Domain; 8] = [
        Domain::Matches,
        Domain::Events,
        Domain::Rankings,
        Domain::Team,
        Domain::EventLineups,
        Domain::Match,
        Domain::MapStats,
        Domain::Swiss,
    ];

    /// Stable name used for worker scripts, endpoints and store directories
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Matches => "matches",
            Self::Events => "events",
            Self::Rankings => "rankings",
            Self::Team => "team",
            Self::EventLineups => "event-lineups",
            Self::Match => "match",
            Self::MapStats => "map-stats",
            Self::Swiss => "swiss",
        }
    }

    /// Whether fetching this domain needs an identifier argument
    pub fn requires_id(&self) -> bool {
        !self.is_listing()
    }

    pub fn is_listing(&self) -> bool {
        matches!(self, Self::Matches | Self::Events | Self::Rankings)
    }

    /// Global listings are never legitimately empty; an empty primary
    /// response for these is treated as a disguised block.
    pub fn is_block_sensitive(&self) -> bool {
        self.is_listing()
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// A record type extracted from one domain's documents
pub trait Record: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    /// Domain this record is extracted from
    const DOMAIN: Domain;

    /// External identifier used as the upsert key
    fn key(&self) -> String;

    /// Fill derived fields and enforce internal consistency
    fn normalize(self) -> Self {
        self
    }

    /// Order records extracted from the same document. The default keeps
    /// source order.
    fn order(_records: &mut [Self]) {}

    fn into_extracted(self) -> ExtractedRecord;
}

/// Extract all records of type `R` from a raw document
///
/// Arrays yield one record per element, objects yield a single record and
/// `null` yields nothing. Array elements that cannot be decoded are logged
/// and skipped; the document is malformed only when it has some other
/// shape, or when none of its elements decode.
pub fn extract_records<R: Record>(document: &RawDocument) -> Result<Vec<R>, SyncError> {
    let entries = match document.json()? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        value @ Value::Object(_) => vec![value],
        other => {
            return Err(SyncError::malformed(
                format!("{} document", R::DOMAIN),
                format!("expected object or array, got {}", other),
            ));
        }
    };

    let total = entries.len();
    let mut records = Vec::with_capacity(total);
    let mut first_error = None;
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<R>(entry) {
            Ok(record) => records.push(record.normalize()),
            Err(e) => {
                let err = SyncError::malformed(format!("{} record #{}", R::DOMAIN, index), e);
                log::warn!("Skipping entry: {}", err);
                first_error.get_or_insert(err);
            }
        }
    }
    if records.is_empty() {
        if let Some(err) = first_error {
            return Err(err);
        }
    } else if first_error.is_some() {
        log::warn!(
            "Kept {} of {} {} record(s) from {} document",
            records.len(),
            total,
            R::DOMAIN,
            document.strategy
        );
    }

    R::order(&mut records);
    log::debug!(
        "Extracted {} {} record(s) from {} document",
        records.len(),
        R::DOMAIN,
        document.strategy
    );
    Ok(records)
}

/// Any extracted record, tagged by domain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedRecord {
    Match(Match),
    Event(Event),
    TeamRanking(TeamRanking),
    TeamDetails(TeamDetails),
    EventLineups(EventLineups),
    MatchDetails(MatchDetails),
    MapStats(MapStats),
    SwissRound(SwissRound),
}

impl ExtractedRecord {
    pub fn domain(&self) -> Domain {
        match self {
            Self::Match(_) => Domain::Matches,
            Self::Event(_) => Domain::Events,
            Self::TeamRanking(_) => Domain::Rankings,
            Self::TeamDetails(_) => Domain::Team,
            Self::EventLineups(_) => Domain::EventLineups,
            Self::MatchDetails(_) => Domain::Match,
            Self::MapStats(_) => Domain::MapStats,
            Self::SwissRound(_) => Domain::Swiss,
        }
    }

    pub fn key(&self) -> String {
        match self {
            Self::Match(r) => r.key(),
            Self::Event(r) => r.key(),
            Self::TeamRanking(r) => r.key(),
            Self::TeamDetails(r) => r.key(),
            Self::EventLineups(r) => r.key(),
            Self::MatchDetails(r) => r.key(),
            Self::MapStats(r) => r.key(),
            Self::SwissRound(r) => r.key(),
        }
    }
}

/// Extract a document of any domain into tagged records
pub fn extract_any(domain: Domain, document: &RawDocument) -> Result<Vec<ExtractedRecord>, SyncError> {
    fn tagged<R: Record>(document: &RawDocument) -> Result<Vec<ExtractedRecord>, SyncError> {
        Ok(extract_records::<R>(document)?
            .into_iter()
            .map(Record::into_extracted)
            .collect())
    }

    match domain {
        Domain::Matches => tagged::<Match>(document),
        Domain::Events => tagged::<Event>(document),
        Domain::Rankings => tagged::<TeamRanking>(document),
        Domain::Team => tagged::<TeamDetails>(document),
        Domain::EventLineups => tagged::<EventLineups>(document),
        Domain::Match => tagged::<MatchDetails>(document),
        Domain::MapStats => tagged::<MapStats>(document),
        Domain::Swiss => tagged::<SwissRound>(document),
    }
}
