//! Extractor trait and the upstream listing extractor

use crate::acquire::{Acquirer, RawDocument};
use crate::client::PrimaryClient;
use crate::records::Domain;
use eyre::Result;

/// Extractor trait for extracting data from a source
///
/// Implementors define how to extract items from sources like:
/// - The upstream source (via the acquisition layer)
/// - The local record store
///
/// # Example
/// ```no_run
/// use esports_sync::etl::Extractor;
/// use eyre::Result;
///
/// struct FixedIds(Vec<u64>);
///
/// impl Extractor for FixedIds {
///     type Item = u64;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract items from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, process, parsing, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}

/// Extractor for a global listing (matches, events, rankings)
///
/// Yields the listing document, or nothing when the upstream has no data.
pub struct ListingExtractor<'a, P> {
    acquirer: &'a Acquirer<P>,
    domain: Domain,
}

impl<'a, P: PrimaryClient> ListingExtractor<'a, P> {
    pub fn new(acquirer: &'a Acquirer<P>, domain: Domain) -> Self {
        debug_assert!(domain.is_listing(), "{} is not a listing domain", domain);
        Self { acquirer, domain }
    }
}

impl<P: PrimaryClient> Extractor for ListingExtractor<'_, P> {
    type Item = RawDocument;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let acquisition = self.acquirer.acquire(self.domain, &[]).await;
        if acquisition.used_fallback() {
            log::info!("{} listing acquired through fallback", self.domain);
        }
        let document = acquisition.into_result()?;
        Ok(document.into_iter().collect())
    }
}
