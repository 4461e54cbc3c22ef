//! Configuration from environment variables
//!
//! Variables are usually sourced from a `.env` file by the CLI before
//! [`SyncConfig::from_env`] runs.

use crate::bridge::DEFAULT_WORKER_TIMEOUT;
use crate::client::{Auth, AuthType};
use crate::jobs::{
    DEFAULT_CONCURRENCY, DEFAULT_JOB_MAX_DURATION, DEFAULT_MATCH_LOOKBACK_HOURS,
    DEFAULT_MAX_CONSECUTIVE_FAILURES,
};
use eyre::{Context, Result, eyre};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime settings for acquisition, storage and jobs
#[derive(Debug)]
pub struct SyncConfig {
    /// Primary client base URL; `None` runs fallback-only
    pub upstream_url: Option<Url>,
    pub auth: Auth,
    pub upstream_timeout: Duration,
    /// Worker interpreter; `None` disables the fallback
    pub worker_program: Option<String>,
    pub worker_dir: PathBuf,
    pub worker_extension: String,
    pub worker_timeout: Duration,
    pub data_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub concurrency: usize,
    pub max_consecutive_failures: u32,
    pub job_max_duration: Duration,
    pub match_lookback_hours: i64,
}

impl SyncConfig {
    /// Load configuration from environment variables
    ///
    /// Expected environment variables:
    /// - UPSTREAM_URL: primary client base URL (optional)
    /// - UPSTREAM_AUTH: `apikey`, `basic` or `none` (optional, detected from credentials)
    /// - UPSTREAM_APIKEY: API key (optional)
    /// - UPSTREAM_USERNAME / UPSTREAM_PASSWORD: basic auth (optional)
    /// - UPSTREAM_TIMEOUT_SECS: request timeout (default 30)
    /// - WORKER_PROGRAM: worker interpreter, empty disables fallback (default `node`)
    /// - WORKER_DIR / WORKER_EXTENSION: worker scripts (default `workers`, `js`)
    /// - WORKER_TIMEOUT_SECS: per-worker budget (default 300)
    /// - SYNC_DATA_DIR: record store and run log (default `data`)
    /// - SYNC_MANIFEST: tracking manifest (default `sync.yml`)
    /// - SYNC_CONCURRENCY: items in flight, clamped to 1..=9 (default 3)
    /// - SYNC_MAX_CONSECUTIVE_FAILURES: early-abort threshold, 0 disables (default 5)
    /// - JOB_MAX_DURATION_SECS: per-invocation ceiling (default 600)
    /// - MATCH_LOOKBACK_HOURS: how long a started match stays pending (default 6)
    pub fn from_env() -> Result<Self> {
        let upstream_url = match var("UPSTREAM_URL") {
            Some(url) => {
                Some(Url::parse(&url).with_context(|| format!("Invalid UPSTREAM_URL: {}", url))?)
            }
            None => None,
        };

        let username = var("UPSTREAM_USERNAME");
        let password = var("UPSTREAM_PASSWORD");
        let apikey = var("UPSTREAM_APIKEY");
        let auth = match var("UPSTREAM_AUTH") {
            Some(kind) => {
                let auth_type = AuthType::from_str(&kind)
                    .map_err(|_| eyre!("Invalid UPSTREAM_AUTH: {} (expected apikey, basic or none)", kind))?;
                Auth::new(&auth_type, username, password, apikey)
            }
            None => Auth::detect(username, password, apikey),
        };

        // An explicitly empty WORKER_PROGRAM turns the fallback off
        let worker_program = match std::env::var("WORKER_PROGRAM") {
            Ok(program) if program.trim().is_empty() => None,
            Ok(program) => Some(program.trim().to_string()),
            Err(_) => Some("node".to_string()),
        };

        Ok(Self {
            upstream_url,
            auth,
            upstream_timeout: secs("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT)?,
            worker_program,
            worker_dir: var("WORKER_DIR").unwrap_or_else(|| "workers".into()).into(),
            worker_extension: var("WORKER_EXTENSION").unwrap_or_else(|| "js".into()),
            worker_timeout: secs("WORKER_TIMEOUT_SECS", DEFAULT_WORKER_TIMEOUT)?,
            data_dir: var("SYNC_DATA_DIR").unwrap_or_else(|| "data".into()).into(),
            manifest_path: var("SYNC_MANIFEST").unwrap_or_else(|| "sync.yml".into()).into(),
            concurrency: parse("SYNC_CONCURRENCY", DEFAULT_CONCURRENCY)?,
            max_consecutive_failures: parse(
                "SYNC_MAX_CONSECUTIVE_FAILURES",
                DEFAULT_MAX_CONSECUTIVE_FAILURES,
            )?,
            job_max_duration: secs("JOB_MAX_DURATION_SECS", DEFAULT_JOB_MAX_DURATION)?,
            match_lookback_hours: parse("MATCH_LOOKBACK_HOURS", DEFAULT_MATCH_LOOKBACK_HOURS)?,
        })
    }
}

/// Non-blank value of an environment variable
fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| eyre!("Invalid {}: {} ({})", name, raw, e)),
        None => Ok(default),
    }
}

fn secs(name: &str, default: Duration) -> Result<Duration> {
    parse(name, default.as_secs()).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 16] = [
        "UPSTREAM_URL",
        "UPSTREAM_AUTH",
        "UPSTREAM_APIKEY",
        "UPSTREAM_USERNAME",
        "UPSTREAM_PASSWORD",
        "UPSTREAM_TIMEOUT_SECS",
        "WORKER_PROGRAM",
        "WORKER_DIR",
        "WORKER_EXTENSION",
        "WORKER_TIMEOUT_SECS",
        "SYNC_DATA_DIR",
        "SYNC_MANIFEST",
        "SYNC_CONCURRENCY",
        "SYNC_MAX_CONSECUTIVE_FAILURES",
        "JOB_MAX_DURATION_SECS",
        "MATCH_LOOKBACK_HOURS",
    ];

    fn clear_env() {
        for name in VARS {
            unsafe { std::env::remove_var(name) };
        }
    }

    fn set(name: &str, value: &str) {
        unsafe { std::env::set_var(name, value) };
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = SyncConfig::from_env().unwrap();

        assert!(config.upstream_url.is_none());
        assert_eq!(config.auth.to_string(), "None");
        assert_eq!(config.worker_program.as_deref(), Some("node"));
        assert_eq!(config.worker_dir, PathBuf::from("workers"));
        assert_eq!(config.worker_timeout, Duration::from_secs(300));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.max_consecutive_failures, 5);
        assert_eq!(config.job_max_duration, Duration::from_secs(600));
        assert_eq!(config.match_lookback_hours, 6);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        set("UPSTREAM_URL", "https://stats.example.com");
        set("UPSTREAM_USERNAME", "sync");
        set("UPSTREAM_PASSWORD", "secret");
        set("WORKER_PROGRAM", "");
        set("SYNC_CONCURRENCY", "5");
        set("SYNC_MAX_CONSECUTIVE_FAILURES", "0");

        let config = SyncConfig::from_env().unwrap();
        assert_eq!(
            config.upstream_url.unwrap().as_str(),
            "https://stats.example.com/"
        );
        assert_eq!(config.auth.to_string(), "Basic");
        assert!(config.worker_program.is_none());
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.max_consecutive_failures, 0);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_explicit_auth_type() {
        clear_env();
        set("UPSTREAM_AUTH", "none");
        set("UPSTREAM_APIKEY", "k");
        assert_eq!(SyncConfig::from_env().unwrap().auth.to_string(), "None");

        set("UPSTREAM_AUTH", "token");
        assert!(SyncConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_number_names_variable() {
        clear_env();
        set("WORKER_TIMEOUT_SECS", "five");
        let error = SyncConfig::from_env().unwrap_err();
        assert!(error.to_string().contains("WORKER_TIMEOUT_SECS"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_url() {
        clear_env();
        set("UPSTREAM_URL", "not a url");
        assert!(SyncConfig::from_env().is_err());
        clear_env();
    }
}
