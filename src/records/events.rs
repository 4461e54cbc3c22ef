//! Event listing entries and derived event attributes

use super::{ExtractedRecord, Record, lenient};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Prize pool (USD) at or above which an event counts as a major
pub const MAJOR_PRIZE_POOL_USD: u64 = 1_000_000;

/// Case-insensitive name keyword that marks an event as a major
pub const MAJOR_KEYWORD: &str = "major";

static MONEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").ok());

/// Where an event stands relative to a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPhase {
    Upcoming,
    Live,
    Finished,
    /// Start date missing upstream
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date_end: Option<DateTime<Utc>>,
    /// Prize pool as displayed upstream, e.g. `"$1,250,000"`
    #[serde(default, deserialize_with = "lenient::text")]
    pub prize_pool: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub prize_pool_usd: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub team_count: Option<u32>,
    #[serde(default)]
    pub is_major: bool,
}

/// First money amount in a prize pool text, whole dollars
pub fn parse_prize_pool(text: &str) -> Option<u64> {
    let amount = MONEY.as_ref()?.find(text)?.as_str().replace(',', "");
    let whole = amount.split('.').next()?;
    whole.parse().ok()
}

impl Event {
    pub fn phase(&self, now: DateTime<Utc>) -> EventPhase {
        match (self.date_start, self.date_end) {
            (None, _) => EventPhase::Unknown,
            (Some(start), _) if now < start => EventPhase::Upcoming,
            (Some(_), Some(end)) if now > end => EventPhase::Finished,
            (Some(_), _) => EventPhase::Live,
        }
    }

    /// Whether the event still needs lineup and bracket syncing
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        matches!(self.phase(now), EventPhase::Upcoming | EventPhase::Live)
    }

    fn derive_major(&self) -> bool {
        let by_prize = self
            .prize_pool_usd
            .is_some_and(|usd| usd >= MAJOR_PRIZE_POOL_USD);
        let by_name = self
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(MAJOR_KEYWORD));
        by_prize || by_name
    }
}

impl Record for Event {
    const DOMAIN: super::Domain = super::Domain::Events;

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn normalize(mut self) -> Self {
        if self.prize_pool_usd.is_none() {
            self.prize_pool_usd = self.prize_pool.as_deref().and_then(parse_prize_pool);
        }
        self.is_major = self.derive_major();
        self
    }

    fn into_extracted(self) -> ExtractedRecord {
        ExtractedRecord::Event(self)
    }
}
