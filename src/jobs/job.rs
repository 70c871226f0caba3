//! Job state model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AggregatedReport;

/// Lifecycle state of a job.
///
/// Transitions are forward-only: `Queued → Running → {Completed, Failed}`.
/// `Queued → Failed` is also legal (discovery can fail before any work
/// starts). Terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One analysis job and everything a caller can observe about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: Uuid,
    /// The source URL the job was submitted with.
    pub source: String,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Total documents discovered; 0 until discovery completes.
    pub total_items: usize,
    /// Documents whose analysis has finished (success or failure).
    /// Monotonic, never exceeds `total_items` once that is known.
    pub items_processed: usize,
    /// Final report; present exactly when `status` is `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AggregatedReport>,
    /// Failure message; present exactly when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Time of the last state or progress change.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Creates a freshly queued job for `source`.
    pub fn new(source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            status: JobStatus::Queued,
            total_items: 0,
            items_processed: 0,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Progress as a 0-100 percentage. Zero while the total is unknown.
    pub fn progress_percent(&self) -> u8 {
        if self.total_items == 0 {
            return 0;
        }
        ((self.items_processed * 100) / self.total_items).min(100) as u8
    }
}
