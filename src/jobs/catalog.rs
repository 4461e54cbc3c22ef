//! Named sync jobs
//!
//! Listing jobs pull one global document through an ETL pipeline. Detail
//! jobs build a worklist from what the listings already stored (plus the
//! tracking manifest) and fetch each entity through the batch driver.

use super::batch::{BatchDriver, ItemOutcome};
use super::runner::JobHandle;
use crate::acquire::Acquirer;
use crate::client::{PrimaryClient, UpstreamClient};
use crate::error::SyncError;
use crate::etl::{DocumentTransformer, ListingExtractor, Pipeline};
use crate::records::{
    Event, EventLineups, MapStats, Match, MatchDetails, Record, SwissRound, TeamDetails,
    TeamRanking, extract_records,
};
use crate::storage::{RecordStore, SyncManifest};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use eyre::Result;
use owo_colors::OwoColorize;

/// Default window after a match's scheduled start during which it is
/// still worth re-fetching
pub const DEFAULT_MATCH_LOOKBACK_HOURS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobName {
    Matches,
    Events,
    Rankings,
    TeamDetails,
    EventLineups,
    SwissRounds,
    MatchDetails,
    MapStats,
}

impl JobName {
    pub const ALL: [JobName; 8] = [
        JobName::Matches,
        JobName::Events,
        JobName::Rankings,
        JobName::TeamDetails,
        JobName::EventLineups,
        JobName::SwissRounds,
        JobName::MatchDetails,
        JobName::MapStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matches => "matches",
            Self::Events => "events",
            Self::Rankings => "rankings",
            Self::TeamDetails => "team-details",
            Self::EventLineups => "event-lineups",
            Self::SwissRounds => "swiss-rounds",
            Self::MatchDetails => "match-details",
            Self::MapStats => "map-stats",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Matches => "Listing of upcoming and live matches",
            Self::Events => "Listing of events",
            Self::Rankings => "Team ranking table",
            Self::TeamDetails => "Details of ranked and tracked teams",
            Self::EventLineups => "Rosters of live and upcoming events",
            Self::SwissRounds => "Swiss rounds of live and upcoming events",
            Self::MatchDetails => "Vetoes, maps and stats of pending matches",
            Self::MapStats => "Per-map statistics referenced by match details",
        }
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a job body needs
pub struct SyncContext<P = UpstreamClient> {
    pub acquirer: Acquirer<P>,
    pub store: RecordStore,
    pub manifest: SyncManifest,
    pub batch: BatchDriver,
    pub match_lookback: chrono::Duration,
}

impl<P: PrimaryClient> SyncContext<P> {
    pub fn new(acquirer: Acquirer<P>, store: RecordStore) -> Self {
        Self {
            acquirer,
            store,
            manifest: SyncManifest::default(),
            batch: BatchDriver::default(),
            match_lookback: chrono::Duration::hours(DEFAULT_MATCH_LOOKBACK_HOURS),
        }
    }

    pub fn with_manifest(mut self, manifest: SyncManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_batch(mut self, batch: BatchDriver) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_match_lookback(mut self, lookback: chrono::Duration) -> Self {
        self.match_lookback = lookback;
        self
    }

    /// Body of the named job; returns the number of items synced
    pub async fn run(&self, job: JobName, handle: &JobHandle) -> Result<usize> {
        let now = Utc::now();
        match job {
            JobName::Matches => self.sync_listing::<Match>(handle).await,
            JobName::Events => self.sync_listing::<Event>(handle).await,
            JobName::Rankings => self.sync_listing::<TeamRanking>(handle).await,
            JobName::TeamDetails => {
                let ids = self.team_worklist()?;
                self.sync_details::<TeamDetails>(ids, handle).await
            }
            JobName::EventLineups => {
                let ids = self.active_event_worklist(now)?;
                self.sync_details::<EventLineups>(ids, handle).await
            }
            JobName::SwissRounds => {
                let ids = self.active_event_worklist(now)?;
                self.sync_details::<SwissRound>(ids, handle).await
            }
            JobName::MatchDetails => {
                let ids = self.pending_match_worklist(now)?;
                self.sync_details::<MatchDetails>(ids, handle).await
            }
            JobName::MapStats => {
                let ids = self.map_stats_worklist()?;
                self.sync_details::<MapStats>(ids, handle).await
            }
        }
    }

    async fn sync_listing<R: Record>(&self, handle: &JobHandle) -> Result<usize> {
        let pipeline = Pipeline::new(
            ListingExtractor::new(&self.acquirer, R::DOMAIN),
            DocumentTransformer::<R>::new(),
            self.store.clone(),
        );
        let count = pipeline.run().await?;
        handle.note(format!("{} {} record(s) upserted", count, R::DOMAIN));
        Ok(count)
    }

    async fn sync_details<R: Record>(&self, ids: Vec<u64>, handle: &JobHandle) -> Result<usize> {
        if ids.is_empty() {
            log::info!("No {} to sync", R::DOMAIN.cyan());
            handle.note(format!("no {} worklist", R::DOMAIN));
            return Ok(0);
        }

        log::info!("Syncing {} {} item(s)", ids.len(), R::DOMAIN.cyan());
        let summary = self.batch.run(ids, |id| self.sync_one::<R>(id)).await?;
        handle.note(summary.to_string());
        if let Some(first_error) = &summary.first_error {
            handle.note(format!("first error: {}", first_error));
        }
        Ok(summary.synced)
    }

    /// Acquire, extract and persist one entity
    pub async fn sync_one<R: Record>(&self, id: u64) -> Result<ItemOutcome, SyncError> {
        let id = id.to_string();
        let Some(document) = self
            .acquirer
            .acquire(R::DOMAIN, &[id.as_str()])
            .await
            .into_result()?
        else {
            return Ok(ItemOutcome::NotFound);
        };

        let records = extract_records::<R>(&document)?;
        if records.is_empty() {
            return Ok(ItemOutcome::NotFound);
        }

        for record in records {
            self.store
                .upsert(&record.into_extracted())
                .map_err(|e| SyncError::Persist(format!("{:#}", e)))?;
        }
        Ok(ItemOutcome::Synced)
    }

    /// Ranked teams followed by manifest teams
    pub fn team_worklist(&self) -> Result<Vec<u64>> {
        let ranked = self
            .store
            .all::<TeamRanking>()?
            .into_iter()
            .map(|r| r.team_id);
        Ok(merge_ids(ranked, &self.manifest.teams))
    }

    /// Live or upcoming events followed by manifest events
    pub fn active_event_worklist(&self, now: DateTime<Utc>) -> Result<Vec<u64>> {
        let active = self
            .store
            .all::<Event>()?
            .into_iter()
            .filter(|e| e.is_active(now))
            .map(|e| e.id);
        Ok(merge_ids(active, &self.manifest.events))
    }

    /// Live, undated or recently started matches followed by manifest matches
    pub fn pending_match_worklist(&self, now: DateTime<Utc>) -> Result<Vec<u64>> {
        let pending = self
            .store
            .all::<Match>()?
            .into_iter()
            .filter(|m| m.is_pending(now, self.match_lookback))
            .map(|m| m.id);
        Ok(merge_ids(pending, &self.manifest.matches))
    }

    /// Map statistics referenced by stored match details
    pub fn map_stats_worklist(&self) -> Result<Vec<u64>> {
        let referenced = self
            .store
            .all::<MatchDetails>()?
            .into_iter()
            .flat_map(|d| d.map_stats_ids());
        Ok(merge_ids(referenced, &[]))
    }
}

/// Concatenate, dropping repeats and keeping first-seen order
fn merge_ids(ids: impl IntoIterator<Item = u64>, extra: &[u64]) -> Vec<u64> {
    let mut merged: Vec<u64> = Vec::new();
    for id in ids.into_iter().chain(extra.iter().copied()) {
        if !merged.contains(&id) {
            merged.push(id);
        }
    }
    merged
}
