//! Error types for writerlens operations.
//!
//! Defines error types for the major subsystems:
//! - Job submission and validation
//! - Document discovery (feed fetching and parsing)
//! - Per-document insight extraction
//! - Report aggregation
//! - LLM API interactions

use thiserror::Error;

/// Errors that reject a job submission before any job is created.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Source URL must not be empty")]
    EmptySource,

    #[error("Invalid source URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme '{0}': only http and https are accepted")]
    UnsupportedScheme(String),
}

/// Errors that can occur while discovering an author's documents.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch feed from '{url}': {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Feed at '{url}' returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse feed from '{url}': {reason}")]
    ParseFailed { url: String, reason: String },

    #[error("Unsupported source host '{0}': expected a Medium or Substack URL")]
    UnsupportedSource(String),

    #[error("Discovery timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

/// Errors scoped to the analysis of a single document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Document has no analyzable text")]
    EmptyDocument,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to parse insight response: {0}")]
    ParseError(String),

    #[error("Extraction timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

/// Errors that can occur while combining per-document insights.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("No successful insights to aggregate")]
    NoInsights,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Aggregation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: LLM_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Model returned an empty completion")]
    EmptyCompletion,
}
