//! Data model for the analysis pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::Sentiment;

/// Number of key themes every insight carries.
pub const THEME_COUNT: usize = 3;

/// Sentinel used to pad insights whose LLM returned fewer themes.
pub const THEME_PLACEHOLDER: &str = "(no further theme identified)";

/// A single post discovered from an author's feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier within the job (feed entry id or url).
    pub id: String,
    /// Post title.
    pub title: String,
    /// Canonical link to the post.
    pub url: String,
    /// Plain text of the post, HTML stripped.
    pub text: String,
    /// Publication timestamp, when the feed provided one.
    pub published: Option<DateTime<Utc>>,
}

/// Analysis outcome for one document.
///
/// A failed extraction still produces an insight so the pipeline can
/// account for every document; `failed` is set and the analysis fields
/// hold neutral defaults. Failed insights never reach the final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInsight {
    /// Identifier of the analyzed document.
    pub document_id: String,
    /// Title of the analyzed document.
    pub title: String,
    /// Link to the analyzed document.
    pub url: String,
    /// Exactly [`THEME_COUNT`] key themes, padded with
    /// [`THEME_PLACEHOLDER`] when the model returned fewer.
    pub key_themes: Vec<String>,
    /// Short prose summary of the post.
    pub summary: String,
    /// Flesch reading-ease score of the post.
    pub readability_score: f64,
    /// Lexicon sentiment of the post.
    pub sentiment: Sentiment,
    /// Word count before stopword filtering.
    pub word_count: usize,
    /// Sentence count of the post.
    pub sentence_count: usize,
    /// Whether analysis of this document failed.
    pub failed: bool,
    /// Failure message when `failed` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentInsight {
    /// Builds the insight recorded for a document whose analysis failed.
    pub fn failure(document: &Document, message: impl Into<String>) -> Self {
        Self {
            document_id: document.id.clone(),
            title: document.title.clone(),
            url: document.url.clone(),
            key_themes: vec![THEME_PLACEHOLDER.to_string(); THEME_COUNT],
            summary: String::new(),
            readability_score: 0.0,
            sentiment: Sentiment::Neutral,
            word_count: 0,
            sentence_count: 0,
            failed: true,
            error: Some(message.into()),
        }
    }

    /// Pads or truncates a theme list to exactly [`THEME_COUNT`] entries.
    pub fn normalize_themes(mut themes: Vec<String>) -> Vec<String> {
        themes.retain(|t| !t.trim().is_empty());
        themes.truncate(THEME_COUNT);
        while themes.len() < THEME_COUNT {
            themes.push(THEME_PLACEHOLDER.to_string());
        }
        themes
    }
}

/// The final combined writing profile for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedReport {
    /// Most frequent deduplicated themes across successful insights.
    pub key_themes: Vec<String>,
    /// LLM-synthesized conclusion over the per-post summaries.
    pub conclusion: String,
    /// Most common writing-style label.
    pub writing_style: String,
    /// Mean readability score over successful insights.
    pub readability_score: f64,
    /// Most common sentiment.
    pub sentiment: Sentiment,
    /// Number of documents that were successfully analyzed.
    pub documents_analyzed: usize,
    /// The per-document insights that succeeded.
    pub documents: Vec<DocumentInsight>,
}
