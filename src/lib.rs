//! writerlens: asynchronous writer-analysis service.
//!
//! This library discovers an author's posts, analyzes each one with text
//! metrics and an LLM, and aggregates a single writing profile, all driven
//! through an in-memory job orchestrator that callers poll for progress.

// Core modules
pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod llm;
pub mod sources;
pub mod text;
pub mod utils;

// Re-export commonly used error types
pub use error::{AggregationError, DiscoveryError, ExtractionError, LlmError, SubmitError};
