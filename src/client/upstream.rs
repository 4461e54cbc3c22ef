//! Upstream client module
//!
//! Provides `UpstreamClient`, the primary (high-level) acquisition path:
//! one GET per endpoint against the upstream data API.

use super::{Auth, PrimaryClient};
use crate::records::Domain;
use base64::Engine;
use eyre::{Context, Result, eyre};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Markers of an anti-bot interstitial served in place of data
const CHALLENGE_MARKERS: [&str; 4] = [
    "cf-chl",
    "cf_chl_opt",
    "challenge-platform",
    "Just a moment...",
];

/// Upstream data API client.
///
/// Endpoints follow `{base}/api/{domain}[/{id}...]`. Errors are plain text
/// so the acquisition layer can inspect them for blocking signals.
///
/// # Example
/// ```no_run
/// use esports_sync::client::{Auth, PrimaryClient, UpstreamClient};
/// use esports_sync::records::Domain;
/// use std::time::Duration;
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("http://localhost:8080")?;
/// let client = UpstreamClient::try_new(url, Auth::None, Duration::from_secs(30))?;
/// let body = client.fetch(Domain::Match, &["2371234"]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    client: Client,
    url: Url,
}

impl UpstreamClient {
    /// Create a new client from a base URL, auth and request timeout.
    ///
    /// # Errors
    /// Returns an error if the auth headers are invalid or the HTTP client
    /// cannot be built
    pub fn try_new(url: Url, auth: Auth, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, "application/json".parse()?);
        match auth {
            Auth::Basic(username, password) => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                headers.append(
                    reqwest::header::AUTHORIZATION,
                    format!("Basic {}", credentials).parse()?,
                );
            }
            Auth::Apikey(apikey) => {
                headers.append("X-Api-Key", apikey.parse()?);
            }
            Auth::None => {}
        }
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("esports-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, url })
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// API path for a domain and its identifiers
    pub fn endpoint(domain: Domain, ids: &[&str]) -> String {
        let mut path = format!("api/{}", domain.slug());
        for id in ids {
            path.push('/');
            path.push_str(id);
        }
        path
    }

    /// Send a GET request to a path relative to the base URL.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let path_stripped = path.strip_prefix('/').unwrap_or(path);
        let url = self
            .url
            .join(path_stripped)
            .with_context(|| format!("Invalid upstream path: {}", path))?;
        log::trace!("GET {}", url);
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request: {}", e))
    }
}

/// Name the anti-bot vendor if `body` is a challenge page
fn challenge_vendor(body: &str) -> Option<&'static str> {
    CHALLENGE_MARKERS
        .iter()
        .any(|marker| body.contains(marker))
        .then_some(crate::acquire::VENDOR_TOKEN)
}

impl PrimaryClient for UpstreamClient {
    async fn fetch(&self, domain: Domain, ids: &[&str]) -> Result<Option<String>> {
        let path = Self::endpoint(domain, ids);
        let response = self.get(&path).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            log::debug!("Upstream has no {} for {:?}", domain, ids);
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} response", domain))?;

        let challenge = challenge_vendor(&body);
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            match challenge {
                Some(vendor) => eyre::bail!(
                    "Request failed: {} {} ({} challenge)",
                    status.as_u16(),
                    reason,
                    vendor
                ),
                None => eyre::bail!("Request failed: {} {}", status.as_u16(), reason),
            }
        }
        if let Some(vendor) = challenge {
            eyre::bail!("{} challenge: blocked", vendor);
        }

        Ok(Some(body))
    }
}

impl std::fmt::Display for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::is_blocking_signal;

    #[test]
    fn test_endpoint() {
        assert_eq!(UpstreamClient::endpoint(Domain::Rankings, &[]), "api/rankings");
        assert_eq!(
            UpstreamClient::endpoint(Domain::MapStats, &["190001"]),
            "api/map-stats/190001"
        );
    }

    #[test]
    fn test_client_creation() {
        let url = Url::parse("http://localhost:8080").unwrap();
        let client = UpstreamClient::try_new(
            url,
            Auth::Basic("user".into(), "pass".into()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.to_string(), "http://localhost:8080/");
        assert_eq!(client.url().host_str(), Some("localhost"));
    }

    #[test]
    fn test_challenge_pages_read_as_blocked() {
        let page = "<html><title>Just a moment...</title><script src=\"/cdn-cgi/challenge-platform/x\"></script>";
        let vendor = challenge_vendor(page).unwrap();
        let message = format!("{} challenge: blocked", vendor);
        assert!(is_blocking_signal(&message));

        assert!(challenge_vendor(r#"[{"teamId": 1}]"#).is_none());
    }
}
