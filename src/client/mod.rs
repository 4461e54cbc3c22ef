//! Primary upstream client and authentication.
//!
//! This module provides the [`PrimaryClient`] seam used by the acquisition
//! layer, its HTTP implementation [`UpstreamClient`], and authentication
//! types ([`Auth`], [`AuthType`]).

mod auth;
mod upstream;

pub use auth::{Auth, AuthType};
pub use upstream::UpstreamClient;

use crate::records::Domain;

/// High-level client that fetches one upstream document per call
///
/// Errors are reported as text-bearing reports; the acquisition layer
/// inspects the message for blocking signals.
pub trait PrimaryClient: Send + Sync {
    /// Fetch the document for `domain` and `ids`
    ///
    /// Returns `Ok(None)` when the upstream has nothing for the request.
    fn fetch(
        &self,
        domain: Domain,
        ids: &[&str],
    ) -> impl std::future::Future<Output = eyre::Result<Option<String>>> + Send;
}
