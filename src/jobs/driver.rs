//! Background pipeline driver.
//!
//! Runs one job end to end: discovery, bounded-concurrency fan-out over
//! the discovered documents, progress accounting through the store, and
//! aggregation into the terminal result. The driver owns every write to
//! its job after submission.
//!
//! Failure containment is layered: a document failure becomes a failed
//! insight and the loop continues; a stage failure fails the job; and a
//! panic anywhere inside the pipeline is caught at the top so the job
//! still reaches `Failed` instead of staying `Running` forever.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use uuid::Uuid;

use crate::analysis::{Aggregator, Document, DocumentInsight, Extractor};
use crate::config::AppConfig;
use crate::error::{AggregationError, DiscoveryError, ExtractionError};
use crate::jobs::JobStore;
use crate::sources::Discoverer;

/// Message recorded when discovery returns an empty document set.
pub const NO_DOCUMENTS_MESSAGE: &str = "discovery produced no documents";

/// Message recorded when every document failed analysis.
pub const ALL_FAILED_MESSAGE: &str = "no documents were successfully analyzed";

/// Message recorded when the job was cancelled by the caller.
pub const CANCELLED_MESSAGE: &str = "analysis cancelled by caller";

/// Timeouts and concurrency limits for one pipeline run.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Maximum number of documents analyzed concurrently.
    pub max_concurrent_extractions: usize,
    /// Timeout for the discovery stage.
    pub discovery_timeout: Duration,
    /// Timeout for analyzing a single document.
    pub extraction_timeout: Duration,
    /// Timeout for the aggregation stage.
    pub aggregation_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        AppConfig::default().into()
    }
}

impl From<AppConfig> for DriverConfig {
    fn from(config: AppConfig) -> Self {
        Self {
            max_concurrent_extractions: config.max_concurrent_extractions,
            discovery_timeout: config.discovery_timeout,
            extraction_timeout: config.extraction_timeout,
            aggregation_timeout: config.aggregation_timeout,
        }
    }
}

/// Drives jobs from `Queued` to a terminal state.
pub struct PipelineDriver {
    store: Arc<JobStore>,
    discoverer: Arc<dyn Discoverer>,
    extractor: Arc<dyn Extractor>,
    aggregator: Arc<dyn Aggregator>,
    config: DriverConfig,
}

impl PipelineDriver {
    /// Assembles a driver over the given stages.
    pub fn new(
        store: Arc<JobStore>,
        discoverer: Arc<dyn Discoverer>,
        extractor: Arc<dyn Extractor>,
        aggregator: Arc<dyn Aggregator>,
        config: DriverConfig,
    ) -> Self {
        Self {
            store,
            discoverer,
            extractor,
            aggregator,
            config,
        }
    }

    /// Runs the job to a terminal state. Never leaves the job `Running`:
    /// errors and panics alike degrade to `Failed`.
    pub async fn run(&self, job_id: Uuid, source: String) {
        let outcome = std::panic::AssertUnwindSafe(self.run_inner(job_id, &source))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(message)) => {
                tracing::warn!(job_id = %job_id, error = %message, "Job failed");
                self.store.fail(job_id, message);
            }
            Err(_) => {
                tracing::error!(job_id = %job_id, "Analysis pipeline panicked");
                self.store.fail(job_id, "internal error: analysis pipeline panicked");
            }
        }
    }

    async fn run_inner(&self, job_id: Uuid, source: &str) -> Result<(), String> {
        let documents = self.discover(job_id, source).await?;

        // An empty set fails the job directly from `Queued`; no `Running`
        // state is ever observable on this path.
        if documents.is_empty() {
            return Err(NO_DOCUMENTS_MESSAGE.to_string());
        }

        self.store.set_running(job_id, documents.len());
        tracing::info!(job_id = %job_id, documents = documents.len(), "Job running");

        let insights = self.extract_all(job_id, documents).await;

        if self.store.cancel_requested(job_id) {
            return Err(CANCELLED_MESSAGE.to_string());
        }

        if insights.iter().all(|insight| insight.failed) {
            return Err(ALL_FAILED_MESSAGE.to_string());
        }

        let report = match timeout(
            self.config.aggregation_timeout,
            self.aggregator.aggregate(insights),
        )
        .await
        {
            Err(_) => {
                return Err(AggregationError::Timeout {
                    seconds: self.config.aggregation_timeout.as_secs(),
                }
                .to_string())
            }
            Ok(Err(e)) => return Err(e.to_string()),
            Ok(Ok(report)) => report,
        };

        self.store.complete(job_id, report);
        tracing::info!(job_id = %job_id, "Job completed");
        Ok(())
    }

    async fn discover(&self, job_id: Uuid, source: &str) -> Result<Vec<Document>, String> {
        match timeout(self.config.discovery_timeout, self.discoverer.discover(source)).await {
            Err(_) => Err(DiscoveryError::Timeout {
                seconds: self.config.discovery_timeout.as_secs(),
            }
            .to_string()),
            Ok(Err(e)) => {
                tracing::warn!(job_id = %job_id, error = %e, "Discovery failed");
                Err(e.to_string())
            }
            Ok(Ok(documents)) => Ok(documents),
        }
    }

    /// Fans extraction out over the documents with bounded concurrency.
    ///
    /// Each document's outcome (success or failed insight) is recorded and
    /// progress advances through the store as soon as that document is
    /// done. Once cancellation is requested, documents that have not yet
    /// started are skipped; in-flight ones drain normally.
    async fn extract_all(&self, job_id: Uuid, documents: Vec<Document>) -> Vec<DocumentInsight> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_extractions));
        let mut futures = Vec::with_capacity(documents.len());

        for document in documents {
            let semaphore = semaphore.clone();
            let store = self.store.clone();
            let extractor = self.extractor.clone();
            let extraction_timeout = self.config.extraction_timeout;

            futures.push(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("extraction semaphore closed");

                if store.cancel_requested(job_id) {
                    return None;
                }

                let insight =
                    match timeout(extraction_timeout, extractor.extract(&document)).await {
                        Ok(Ok(insight)) => insight,
                        Ok(Err(e)) => {
                            tracing::warn!(
                                job_id = %job_id,
                                document_id = %document.id,
                                error = %e,
                                "Document analysis failed"
                            );
                            DocumentInsight::failure(&document, e.to_string())
                        }
                        Err(_) => {
                            let e = ExtractionError::Timeout {
                                seconds: extraction_timeout.as_secs(),
                            };
                            tracing::warn!(
                                job_id = %job_id,
                                document_id = %document.id,
                                error = %e,
                                "Document analysis timed out"
                            );
                            DocumentInsight::failure(&document, e.to_string())
                        }
                    };

                store.increment_processed(job_id);
                Some(insight)
            });
        }

        join_all(futures).await.into_iter().flatten().collect()
    }
}
