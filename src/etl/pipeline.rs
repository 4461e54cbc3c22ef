//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use eyre::Result;

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
///
/// # Example
/// ```no_run
/// use esports_sync::etl::{DocumentTransformer, ListingExtractor, Pipeline};
/// use esports_sync::records::{Domain, TeamRanking};
/// use esports_sync::storage::RecordStore;
/// # use esports_sync::acquire::Acquirer;
///
/// # async fn example(acquirer: Acquirer) -> eyre::Result<()> {
/// let pipeline = Pipeline::new(
///     ListingExtractor::new(&acquirer, Domain::Rankings),
///     DocumentTransformer::<TeamRanking>::new(),
///     RecordStore::new("data"),
/// );
///
/// let count = pipeline.run().await?;
/// println!("Synced {} rankings", count);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Returns the number of items successfully loaded. An empty extraction
    /// is a successful run that loads nothing.
    ///
    /// # Errors
    /// Returns an error if any stage fails
    pub async fn run(&self) -> Result<usize> {
        log::debug!("Extracting from source...");
        let items = self.extractor.extract().await?;
        log::debug!("Extracted {} documents", items.len());

        if items.is_empty() {
            log::info!("Nothing extracted, pipeline complete");
            return Ok(0);
        }

        let transformed = self.transformer.transform_many(items)?;
        log::debug!("Transformed into {} records", transformed.len());

        let count = self.loader.load(transformed).await?;
        log::info!("Loaded {} records", count);

        Ok(count)
    }
}
