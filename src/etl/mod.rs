//! Core ETL (Extract, Transform, Load) abstractions
//!
//! This module provides trait definitions for building sync pipelines
//! that acquire upstream documents, turn them into records, and persist them.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::{Extractor, ListingExtractor};
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::{DocumentTransformer, Transformer};
