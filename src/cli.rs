//! CLI helper functions

use crate::{
    acquire::Acquirer,
    bridge::WorkerBridge,
    client::UpstreamClient,
    config::SyncConfig,
    jobs::{BatchDriver, JobFailed, JobName, JobReport, SyncContext, SyncJobRun, SyncJobRunner},
    records::{Domain, ExtractedRecord, extract_any},
    storage::{NdjsonRunLog, RecordStore, SyncManifest},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;

/// Load configuration from environment variables
pub fn load_config() -> Result<SyncConfig> {
    SyncConfig::from_env().context("Failed to load configuration")
}

/// Build the acquirer from whichever strategies are configured
///
/// Without `UPSTREAM_URL` every fetch goes straight to the worker; with an
/// empty `WORKER_PROGRAM` blocked fetches have nowhere to fall back to.
pub fn build_acquirer(config: &SyncConfig) -> Result<Acquirer> {
    let primary = match &config.upstream_url {
        Some(url) => {
            let client =
                UpstreamClient::try_new(url.clone(), config.auth.clone(), config.upstream_timeout)
                    .context("Failed to create upstream client")?;
            log::debug!("Primary client: {} ({} auth)", client.url(), config.auth);
            Some(client)
        }
        None => {
            log::info!("UPSTREAM_URL not set, acquiring through workers only");
            None
        }
    };

    let fallback = config.worker_program.as_ref().map(|program| {
        WorkerBridge::new(program, &config.worker_dir)
            .with_extension(&config.worker_extension)
            .with_timeout(config.worker_timeout)
    });
    if fallback.is_none() {
        log::info!("WORKER_PROGRAM is empty, fallback disabled");
    }

    Acquirer::new(primary, fallback)
}

/// Build the shared job context: acquirer, store, manifest and batch policy
pub fn build_context(config: &SyncConfig) -> Result<SyncContext> {
    let manifest = SyncManifest::load(&config.manifest_path)?;
    let batch = BatchDriver::new(config.concurrency)
        .with_max_consecutive_failures(config.max_consecutive_failures);

    Ok(
        SyncContext::new(build_acquirer(config)?, RecordStore::new(&config.data_dir))
            .with_manifest(manifest)
            .with_batch(batch)
            .with_match_lookback(chrono::Duration::hours(config.match_lookback_hours)),
    )
}

/// Run one named job under the run wrapper
///
/// The outer error covers setup; the inner result is the job's own outcome,
/// whose report has already been written to the run log.
pub async fn run_named_job(
    config: &SyncConfig,
    job: JobName,
) -> Result<std::result::Result<JobReport, JobFailed>> {
    let context = build_context(config)?;
    let runner = SyncJobRunner::new(NdjsonRunLog::in_dir(&config.data_dir))
        .with_max_duration(config.job_max_duration);

    Ok(runner
        .run_job(job.as_str(), |handle| async move {
            context.run(job, &handle).await
        })
        .await)
}

/// Acquire and extract one document without persisting anything
pub async fn fetch_records(
    config: &SyncConfig,
    domain: Domain,
    ids: &[String],
) -> Result<Vec<ExtractedRecord>> {
    if domain.requires_id() && ids.is_empty() {
        eyre::bail!("{} requires an identifier", domain);
    }
    if !domain.requires_id() && !ids.is_empty() {
        eyre::bail!("{} is a global listing and takes no identifier", domain);
    }

    let acquirer = build_acquirer(config)?;
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    log::info!("Fetching {} {}", domain.cyan(), ids.join(" ").bright_black());

    let acquisition = acquirer.acquire(domain, &ids).await;
    for attempt in &acquisition.attempts {
        log::info!(
            "{} attempt: {:?} in {}ms",
            attempt.strategy,
            attempt.outcome,
            attempt.elapsed.as_millis()
        );
    }

    match acquisition.into_result()? {
        Some(document) => Ok(extract_any(domain, &document)?),
        None => {
            log::warn!("{} {} not found upstream", domain, ids.join(" "));
            Ok(Vec::new())
        }
    }
}

/// Most recent job runs, newest first
pub fn recent_runs(config: &SyncConfig, limit: usize) -> Result<Vec<SyncJobRun>> {
    NdjsonRunLog::in_dir(&config.data_dir).recent(limit)
}
