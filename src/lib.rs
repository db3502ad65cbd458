pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use config::Config;
pub use domain::{
    FlatRecord, PropertyRecord, QualityCategory, QualityScore, ScoredRecord, Valuation,
    ValueRating, ValuedRecord,
};
pub use error::{PipelineError, Result};
pub use pipeline::batch::{BatchExtractor, BatchReport, RunStatus, SkippedListing};
pub use pipeline::ingestion::{DocumentSource, FileSource, InMemorySource};
pub use pipeline::processing::normalize::{fields, Normalizer, RecordExtractor};
pub use pipeline::processing::parser::ListingDocument;
pub use pipeline::processing::quality_gate::{QualityGate, QualityScorer};
pub use pipeline::processing::valuation::ValuationEngine;
pub use pipeline::{Pipeline, PipelineResult};
