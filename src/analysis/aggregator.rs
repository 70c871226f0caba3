//! Whole-job report aggregation.
//!
//! Folds the successful per-document insights into one writing profile:
//! most frequent themes, dominant style and sentiment, mean readability,
//! and one LLM call that turns the per-post summaries into a conclusion.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::analysis::{AggregatedReport, DocumentInsight, THEME_PLACEHOLDER};
use crate::error::AggregationError;
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::text::{self, Sentiment};

/// System prompt for the conclusion call.
const CONCLUSION_SYSTEM_PROMPT: &str = "You are a writing analyst. You are given short summaries \
of several posts by the same author. Write one paragraph describing the author's recurring \
interests and overall writing voice. Respond with the paragraph only.";

/// Combines successful insights into an [`AggregatedReport`].
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Aggregate the job's insights.
    ///
    /// `insights` holds every per-document insight, failed entries
    /// included; implementations aggregate over the successful subset
    /// and only that subset appears in the report.
    async fn aggregate(
        &self,
        insights: Vec<DocumentInsight>,
    ) -> Result<AggregatedReport, AggregationError>;
}

/// Default aggregator: frequency/mode statistics plus one LLM call for
/// the conclusion paragraph.
pub struct LlmAggregator {
    llm: Arc<dyn LlmProvider>,
    /// Number of deduplicated themes kept in the report.
    top_theme_count: usize,
}

impl LlmAggregator {
    /// Create an aggregator backed by the given LLM provider.
    pub fn new(llm: Arc<dyn LlmProvider>, top_theme_count: usize) -> Self {
        Self {
            llm,
            top_theme_count,
        }
    }

    /// Deduplicated themes ordered by frequency, ties broken by first
    /// appearance, placeholders excluded.
    fn top_themes(insights: &[&DocumentInsight], limit: usize) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for insight in insights {
            for theme in &insight.key_themes {
                if theme == THEME_PLACEHOLDER {
                    continue;
                }
                let entry = counts.entry(theme.as_str()).or_insert(0);
                if *entry == 0 {
                    order.push(theme.as_str());
                }
                *entry += 1;
            }
        }

        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.into_iter().take(limit).map(String::from).collect()
    }

    /// Most common value in a list; earliest occurrence wins ties.
    fn mode<T: Clone + Eq + std::hash::Hash>(values: impl Iterator<Item = T>) -> Option<T> {
        let mut counts: HashMap<T, usize> = HashMap::new();
        let mut order: Vec<T> = Vec::new();
        for value in values {
            let entry = counts.entry(value.clone()).or_insert(0);
            if *entry == 0 {
                order.push(value);
            }
            *entry += 1;
        }

        let mut best: Option<T> = None;
        let mut best_count = 0;
        for value in order {
            let count = counts[&value];
            if count > best_count {
                best_count = count;
                best = Some(value);
            }
        }
        best
    }

    async fn synthesize_conclusion(
        &self,
        insights: &[&DocumentInsight],
    ) -> Result<String, AggregationError> {
        let summaries: Vec<String> = insights
            .iter()
            .enumerate()
            .map(|(i, insight)| format!("{}. {}", i + 1, insight.summary))
            .collect();

        let request = GenerationRequest::new(
            String::new(),
            vec![
                Message::system(CONCLUSION_SYSTEM_PROMPT),
                Message::user(summaries.join("\n")),
            ],
        )
        .with_temperature(0.5)
        .with_max_tokens(300);

        let response = self.llm.generate(request).await?;
        let content = response
            .first_content()
            .ok_or(crate::error::LlmError::EmptyCompletion)?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl Aggregator for LlmAggregator {
    async fn aggregate(
        &self,
        insights: Vec<DocumentInsight>,
    ) -> Result<AggregatedReport, AggregationError> {
        let successful: Vec<&DocumentInsight> = insights.iter().filter(|i| !i.failed).collect();
        if successful.is_empty() {
            return Err(AggregationError::NoInsights);
        }

        let key_themes = Self::top_themes(&successful, self.top_theme_count);

        let writing_style = Self::mode(
            successful
                .iter()
                .map(|i| text::writing_style(i.word_count, i.sentence_count).to_string()),
        )
        .unwrap_or_else(|| "Unknown".to_string());

        let sentiment =
            Self::mode(successful.iter().map(|i| i.sentiment)).unwrap_or(Sentiment::Neutral);

        let readability_score = successful
            .iter()
            .map(|i| i.readability_score)
            .sum::<f64>()
            / successful.len() as f64;

        let conclusion = self.synthesize_conclusion(&successful).await?;

        tracing::info!(
            documents_analyzed = successful.len(),
            themes = key_themes.len(),
            writing_style = %writing_style,
            sentiment = %sentiment,
            "Report aggregated"
        );

        let documents_analyzed = successful.len();
        let documents: Vec<DocumentInsight> =
            insights.into_iter().filter(|i| !i.failed).collect();

        Ok(AggregatedReport {
            key_themes,
            conclusion,
            writing_style,
            readability_score,
            sentiment,
            documents_analyzed,
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{Choice, GenerationResponse, Usage};

    struct FixedLlm {
        reply: String,
    }

    #[async_trait]
    impl LlmProvider for FixedLlm {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            Ok(GenerationResponse {
                id: "r".to_string(),
                model: "test".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(self.reply.clone()),
                    finish_reason: "stop".to_string(),
                }],
                usage: Usage {
                    prompt_tokens: 0,
                    completion_tokens: 0,
                    total_tokens: 0,
                },
            })
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            Err(LlmError::RequestFailed("connection refused".to_string()))
        }
    }

    fn insight(id: &str, themes: &[&str], sentiment: Sentiment, readability: f64) -> DocumentInsight {
        DocumentInsight {
            document_id: id.to_string(),
            title: format!("Post {id}"),
            url: format!("https://example.substack.com/p/{id}"),
            key_themes: DocumentInsight::normalize_themes(
                themes.iter().map(|s| s.to_string()).collect(),
            ),
            summary: format!("Summary of {id}."),
            readability_score: readability,
            sentiment,
            word_count: 300,
            sentence_count: 20,
            failed: false,
            error: None,
        }
    }

    fn aggregator(reply: &str) -> LlmAggregator {
        LlmAggregator::new(
            Arc::new(FixedLlm {
                reply: reply.to_string(),
            }),
            5,
        )
    }

    #[tokio::test]
    async fn test_aggregate_combines_successful_insights() {
        let insights = vec![
            insight("a", &["craft", "voice"], Sentiment::Positive, 60.0),
            insight("b", &["craft", "editing"], Sentiment::Positive, 40.0),
            insight("c", &["craft"], Sentiment::Negative, 50.0),
        ];

        let report = aggregator("A thoughtful author.")
            .aggregate(insights)
            .await
            .unwrap();

        assert_eq!(report.documents_analyzed, 3);
        assert_eq!(report.key_themes[0], "craft");
        assert_eq!(report.sentiment, Sentiment::Positive);
        assert!((report.readability_score - 50.0).abs() < 1e-9);
        assert_eq!(report.conclusion, "A thoughtful author.");
        assert_eq!(report.documents.len(), 3);
    }

    #[tokio::test]
    async fn test_aggregate_drops_failed_documents_from_report() {
        let mut failed = insight("bad", &[], Sentiment::Neutral, 0.0);
        failed.failed = true;
        failed.error = Some("model unavailable".to_string());

        let insights = vec![insight("ok", &["craft"], Sentiment::Neutral, 55.0), failed];

        let report = aggregator("Conclusion.").aggregate(insights).await.unwrap();

        // Only the successful document appears in the report.
        assert_eq!(report.documents_analyzed, 1);
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].document_id, "ok");
        assert!(!report.documents.iter().any(|d| d.failed));
        assert!((report.readability_score - 55.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_aggregate_rejects_all_failed() {
        let mut failed = insight("bad", &[], Sentiment::Neutral, 0.0);
        failed.failed = true;

        let err = aggregator("x").aggregate(vec![failed]).await.unwrap_err();
        assert!(matches!(err, AggregationError::NoInsights));
    }

    #[tokio::test]
    async fn test_aggregate_propagates_llm_failure() {
        let agg = LlmAggregator::new(Arc::new(FailingLlm), 5);
        let err = agg
            .aggregate(vec![insight("a", &["craft"], Sentiment::Neutral, 50.0)])
            .await
            .unwrap_err();
        assert!(matches!(err, AggregationError::Llm(_)));
    }

    #[test]
    fn test_top_themes_excludes_placeholder_and_orders_by_frequency() {
        let a = insight("a", &["craft", "voice"], Sentiment::Neutral, 50.0);
        let b = insight("b", &["voice"], Sentiment::Neutral, 50.0);
        let insights: Vec<&DocumentInsight> = vec![&a, &b];

        let themes = LlmAggregator::top_themes(&insights, 5);
        assert_eq!(themes[0], "voice");
        assert_eq!(themes[1], "craft");
        assert!(!themes.iter().any(|t| t == THEME_PLACEHOLDER));
    }

    #[test]
    fn test_top_themes_respects_limit() {
        let a = insight("a", &["t1", "t2", "t3"], Sentiment::Neutral, 50.0);
        let b = insight("b", &["t4", "t5", "t6"], Sentiment::Neutral, 50.0);
        let insights: Vec<&DocumentInsight> = vec![&a, &b];

        let themes = LlmAggregator::top_themes(&insights, 5);
        assert_eq!(themes.len(), 5);
    }

    #[test]
    fn test_mode_prefers_earliest_on_tie() {
        let mode = LlmAggregator::mode(["x", "y"].into_iter()).unwrap();
        assert_eq!(mode, "x");
    }

    #[test]
    fn test_mode_over_sentiments() {
        let mode = LlmAggregator::mode(
            [
                Sentiment::Negative,
                Sentiment::Positive,
                Sentiment::Positive,
            ]
            .into_iter(),
        )
        .unwrap();
        assert_eq!(mode, Sentiment::Positive);
    }
}
