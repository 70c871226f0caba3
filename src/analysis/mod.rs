//! Document analysis pipeline stages.
//!
//! Defines the data model shared across the pipeline and the two LLM-backed
//! stages: per-document insight extraction and whole-job report aggregation.

mod aggregator;
mod extractor;
mod types;

pub use aggregator::{Aggregator, LlmAggregator};
pub use extractor::{Extractor, LlmExtractor};
pub use types::{AggregatedReport, Document, DocumentInsight, THEME_COUNT, THEME_PLACEHOLDER};
