//! Shared test doubles for the pipeline stages.
#![allow(dead_code)] // Not every test binary uses every helper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use writerlens::analysis::{
    AggregatedReport, Aggregator, Document, DocumentInsight, Extractor,
};
use writerlens::error::{AggregationError, DiscoveryError, ExtractionError};
use writerlens::jobs::{
    AnalysisOrchestrator, DriverConfig, Job, JobStatus, JobStore, PipelineDriver,
};
use writerlens::sources::Discoverer;
use writerlens::text::Sentiment;

/// Builds `count` documents named d0..dN.
pub fn documents(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| Document {
            id: format!("d{i}"),
            title: format!("Post {i}"),
            url: format!("https://example.substack.com/p/{i}"),
            text: format!("Body of post {i}. It talks about writing."),
            published: None,
        })
        .collect()
}

/// Discoverer returning a fixed result.
pub enum StubDiscoverer {
    Documents(Vec<Document>),
    Error(String),
    /// Returns an empty set after the given delay.
    EmptyAfter(Duration),
    /// Sleeps longer than any test's discovery timeout.
    Hang,
}

#[async_trait]
impl Discoverer for StubDiscoverer {
    async fn discover(&self, _source: &str) -> Result<Vec<Document>, DiscoveryError> {
        match self {
            StubDiscoverer::Documents(docs) => Ok(docs.clone()),
            StubDiscoverer::Error(message) => Err(DiscoveryError::FetchFailed {
                url: "https://example.substack.com/feed".to_string(),
                reason: message.clone(),
            }),
            StubDiscoverer::EmptyAfter(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Vec::new())
            }
            StubDiscoverer::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

/// Extractor with scriptable per-document behavior.
pub struct StubExtractor {
    /// Document ids that fail extraction.
    pub failing_ids: Vec<String>,
    /// Delay applied to every extraction.
    pub delay: Duration,
    /// Panic instead of returning, for containment tests.
    pub panic: bool,
    /// Number of extract calls actually made.
    pub calls: AtomicUsize,
}

impl Default for StubExtractor {
    fn default() -> Self {
        Self {
            failing_ids: Vec::new(),
            delay: Duration::ZERO,
            panic: false,
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubExtractor {
    pub fn failing(ids: &[&str]) -> Self {
        Self {
            failing_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, document: &Document) -> Result<DocumentInsight, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic {
            panic!("stub extractor panic");
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing_ids.contains(&document.id) {
            return Err(ExtractionError::ParseError("stubbed failure".to_string()));
        }
        Ok(DocumentInsight {
            document_id: document.id.clone(),
            title: document.title.clone(),
            url: document.url.clone(),
            key_themes: DocumentInsight::normalize_themes(vec![
                "writing".to_string(),
                format!("theme-{}", document.id),
            ]),
            summary: format!("Summary of {}.", document.id),
            readability_score: 60.0,
            sentiment: Sentiment::Neutral,
            word_count: 120,
            sentence_count: 8,
            failed: false,
            error: None,
        })
    }
}

/// Aggregator that combines without an LLM, or fails on demand.
pub struct StubAggregator {
    pub fail: bool,
}

#[async_trait]
impl Aggregator for StubAggregator {
    async fn aggregate(
        &self,
        insights: Vec<DocumentInsight>,
    ) -> Result<AggregatedReport, AggregationError> {
        if self.fail {
            return Err(AggregationError::Llm(
                writerlens::error::LlmError::RequestFailed("stubbed outage".to_string()),
            ));
        }
        let documents: Vec<DocumentInsight> =
            insights.into_iter().filter(|i| !i.failed).collect();
        if documents.is_empty() {
            return Err(AggregationError::NoInsights);
        }
        Ok(AggregatedReport {
            key_themes: vec!["writing".to_string()],
            conclusion: "Stub conclusion.".to_string(),
            writing_style: "Balanced and clear".to_string(),
            readability_score: 60.0,
            sentiment: Sentiment::Neutral,
            documents_analyzed: documents.len(),
            documents,
        })
    }
}

/// Driver config with short timeouts suitable for tests.
pub fn test_config() -> DriverConfig {
    DriverConfig {
        max_concurrent_extractions: 2,
        discovery_timeout: Duration::from_millis(500),
        extraction_timeout: Duration::from_millis(500),
        aggregation_timeout: Duration::from_millis(500),
    }
}

/// Wires an orchestrator over stub stages, returning the store too so
/// tests can inspect raw job state.
pub fn orchestrator(
    discoverer: StubDiscoverer,
    extractor: StubExtractor,
    aggregator: StubAggregator,
    config: DriverConfig,
) -> (Arc<AnalysisOrchestrator>, Arc<JobStore>) {
    let store = Arc::new(JobStore::new());
    let driver = Arc::new(PipelineDriver::new(
        store.clone(),
        Arc::new(discoverer),
        Arc::new(extractor),
        Arc::new(aggregator),
        config,
    ));
    (
        Arc::new(AnalysisOrchestrator::new(store.clone(), driver)),
        store,
    )
}

/// Polls until the job reaches a terminal state.
pub async fn wait_terminal(orchestrator: &AnalysisOrchestrator, id: Uuid) -> Job {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(job) = orchestrator.status(id) {
                if job.status.is_terminal() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("job did not reach a terminal state in time")
}

/// Polls until the job is `Running`.
pub async fn wait_running(orchestrator: &AnalysisOrchestrator, id: Uuid) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(job) = orchestrator.status(id) {
                if job.status == JobStatus::Running || job.status.is_terminal() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("job never started running");
}
