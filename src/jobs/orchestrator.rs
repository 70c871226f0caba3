//! Job orchestrator: the public entry point for analysis jobs.

use std::sync::Arc;

use reqwest::Url;
use uuid::Uuid;

use crate::error::SubmitError;
use crate::jobs::{CancelOutcome, Job, JobStore, PipelineDriver};

/// Accepts submissions, launches drivers, and answers status queries.
///
/// `submit` does synchronous validation only; all network and LLM work
/// happens on the detached driver task it spawns.
pub struct AnalysisOrchestrator {
    store: Arc<JobStore>,
    driver: Arc<PipelineDriver>,
}

impl AnalysisOrchestrator {
    /// Creates an orchestrator over a store and a driver.
    pub fn new(store: Arc<JobStore>, driver: Arc<PipelineDriver>) -> Self {
        Self { store, driver }
    }

    /// Validates `source`, registers a queued job, and spawns its driver.
    ///
    /// Returns the job id immediately; the caller polls [`status`] for
    /// progress. A validation failure creates no job.
    ///
    /// [`status`]: AnalysisOrchestrator::status
    pub fn submit(&self, source: &str) -> Result<Uuid, SubmitError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(SubmitError::EmptySource);
        }

        let url = Url::parse(source).map_err(|e| SubmitError::InvalidUrl {
            url: source.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(SubmitError::UnsupportedScheme(other.to_string())),
        }

        let job = self.store.create(source);
        tracing::info!(job_id = %job.id, source = %source, "Job submitted");

        let driver = self.driver.clone();
        let job_id = job.id;
        let source = source.to_string();
        tokio::spawn(async move {
            driver.run(job_id, source).await;
        });

        Ok(job_id)
    }

    /// Snapshot of a job's current state.
    pub fn status(&self, id: Uuid) -> Option<Job> {
        self.store.get(id)
    }

    /// Requests cancellation of a job.
    pub fn cancel(&self, id: Uuid) -> CancelOutcome {
        let outcome = self.store.request_cancel(id);
        if outcome == CancelOutcome::Accepted {
            tracing::info!(job_id = %id, "Cancellation requested");
        }
        outcome
    }
}
