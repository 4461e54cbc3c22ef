//! Transformer trait for data transformation

use crate::acquire::RawDocument;
use crate::records::{ExtractedRecord, Record, extract_records};
use eyre::Result;
use std::marker::PhantomData;

/// Transformer trait for transforming data items
///
/// One input may yield zero or more outputs, e.g. a listing document
/// yields one record per entry.
///
/// # Example
/// ```no_run
/// use esports_sync::etl::Transformer;
/// use eyre::Result;
///
/// struct Splitter;
///
/// impl Transformer for Splitter {
///     type Input = String;
///     type Output = String;
///
///     fn transform(&self, input: Self::Input) -> Result<Vec<Self::Output>> {
///         Ok(input.split(',').map(str::to_string).collect())
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if transformation fails (validation, conversion, etc.)
    fn transform(&self, input: Self::Input) -> Result<Vec<Self::Output>>;

    /// Transform multiple items, concatenating outputs in input order
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        let mut outputs = Vec::new();
        for input in inputs {
            outputs.extend(self.transform(input)?);
        }
        Ok(outputs)
    }
}

/// Turns raw documents into tagged records of type `R`
pub struct DocumentTransformer<R> {
    _phantom: PhantomData<fn() -> R>,
}

impl<R> Default for DocumentTransformer<R> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<R: Record> DocumentTransformer<R> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: Record> Transformer for DocumentTransformer<R> {
    type Input = RawDocument;
    type Output = ExtractedRecord;

    fn transform(&self, input: Self::Input) -> Result<Vec<Self::Output>> {
        Ok(extract_records::<R>(&input)?
            .into_iter()
            .map(Record::into_extracted)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::Strategy;
    use crate::records::{Domain, TeamRanking};

    #[test]
    fn test_document_transformer() {
        let transformer = DocumentTransformer::<TeamRanking>::new();
        let docs = vec![
            RawDocument::new(r#"[{"teamId": 1}, {"teamId": 2}]"#, Strategy::Primary),
            RawDocument::new(r#"{"teamId": 3}"#, Strategy::Fallback),
        ];
        let records = transformer.transform_many(docs).unwrap();

        let keys: Vec<_> = records.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["1", "2", "3"]);
        assert!(records.iter().all(|r| r.domain() == Domain::Rankings));
    }

    #[test]
    fn test_malformed_document_fails() {
        let transformer = DocumentTransformer::<TeamRanking>::new();
        let result = transformer.transform(RawDocument::new("<html>", Strategy::Primary));
        assert!(result.is_err());
    }
}
