//! Per-document insight extraction.
//!
//! Combines local text metrics with one LLM call that names the post's
//! key themes and writes a short summary. A failure here is scoped to
//! the single document being analyzed.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::analysis::{Document, DocumentInsight};
use crate::error::ExtractionError;
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::text;
use crate::utils::json_extraction::extract_json_from_response;

/// System prompt for the per-post analysis call.
const INSIGHT_SYSTEM_PROMPT: &str = "You are a writing analyst. Given the text of a blog post, \
identify exactly 3 key themes and write a 2-3 sentence summary of the post. \
Respond with JSON only, in the form \
{\"themes\": [\"...\", \"...\", \"...\"], \"summary\": \"...\"}.";

/// Maximum characters of post text sent to the model.
const MAX_PROMPT_CHARS: usize = 12_000;

/// Produces one [`DocumentInsight`] per document.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Analyze a single document.
    async fn extract(&self, document: &Document) -> Result<DocumentInsight, ExtractionError>;
}

/// Structured payload expected back from the insight call.
#[derive(Debug, Deserialize)]
struct InsightPayload {
    themes: Vec<String>,
    summary: String,
}

/// Default extractor: local metrics plus one LLM call.
pub struct LlmExtractor {
    llm: Arc<dyn LlmProvider>,
}

impl LlmExtractor {
    /// Create an extractor backed by the given LLM provider.
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    fn parse_payload(content: &str) -> Result<InsightPayload, ExtractionError> {
        let json = extract_json_from_response(content);
        serde_json::from_str(&json)
            .map_err(|e| ExtractionError::ParseError(format!("{}: {}", e, json)))
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract(&self, document: &Document) -> Result<DocumentInsight, ExtractionError> {
        if document.text.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let metrics = text::process_text(&document.text);

        let mut prompt_text = document.text.clone();
        if prompt_text.len() > MAX_PROMPT_CHARS {
            let mut cut = MAX_PROMPT_CHARS;
            while !prompt_text.is_char_boundary(cut) {
                cut -= 1;
            }
            prompt_text.truncate(cut);
        }

        let request = GenerationRequest::new(
            String::new(),
            vec![
                Message::system(INSIGHT_SYSTEM_PROMPT),
                Message::user(prompt_text),
            ],
        )
        .with_temperature(0.3)
        .with_max_tokens(400);

        let response = self.llm.generate(request).await?;
        let content = response
            .first_content()
            .ok_or(crate::error::LlmError::EmptyCompletion)?;

        let payload = Self::parse_payload(content)?;

        tracing::debug!(
            document_id = %document.id,
            word_count = metrics.word_count,
            readability = metrics.readability_score,
            sentiment = %metrics.sentiment,
            "Document analyzed"
        );

        Ok(DocumentInsight {
            document_id: document.id.clone(),
            title: document.title.clone(),
            url: document.url.clone(),
            key_themes: DocumentInsight::normalize_themes(payload.themes),
            summary: payload.summary,
            readability_score: metrics.readability_score,
            sentiment: metrics.sentiment,
            word_count: metrics.word_count,
            sentence_count: metrics.sentence_count,
            failed: false,
            error: None,
        })
    }
}
