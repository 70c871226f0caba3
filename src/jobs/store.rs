//! In-memory job table.
//!
//! One `RwLock` guards the whole table, so every read sees a consistent
//! snapshot of a job and every write is serialized. Writes to a job come
//! from its single driver task; reads come from any number of status
//! queries. Terminal states are write-protected: once a job completes or
//! fails, later writes are ignored.

use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use crate::analysis::AggregatedReport;
use crate::jobs::{Job, JobStatus};

/// Outcome of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The job will stop at the next opportunity.
    Accepted,
    /// No job with that id exists.
    NotFound,
    /// The job already reached a terminal state.
    AlreadyTerminal,
}

/// Per-job record: the observable job plus the cancellation flag the
/// driver polls.
#[derive(Debug, Clone)]
struct JobRecord {
    job: Job,
    cancel_requested: bool,
}

/// Thread-safe in-memory store of all jobs in the process.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, JobRecord>>,
}

impl JobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly queued job for `source` and returns it.
    pub fn create(&self, source: &str) -> Job {
        let job = Job::new(source);
        let mut jobs = self.write();
        jobs.insert(
            job.id,
            JobRecord {
                job: job.clone(),
                cancel_requested: false,
            },
        );
        job
    }

    /// Returns a snapshot of the job, if it exists.
    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.read().get(&id).map(|record| record.job.clone())
    }

    /// Number of jobs currently tracked.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no jobs.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Marks the job running with the discovered document total.
    ///
    /// No-op for unknown jobs and for jobs already terminal.
    pub fn set_running(&self, id: Uuid, total_items: usize) {
        self.update(id, |job| {
            job.status = JobStatus::Running;
            job.total_items = total_items;
        });
    }

    /// Advances the processed-item counter by one, capped at the total.
    pub fn increment_processed(&self, id: Uuid) {
        self.update(id, |job| {
            if job.items_processed < job.total_items {
                job.items_processed += 1;
            }
        });
    }

    /// Transitions the job to `Completed` with its report.
    ///
    /// Ignored if the job is already terminal.
    pub fn complete(&self, id: Uuid, report: AggregatedReport) {
        self.update(id, |job| {
            job.status = JobStatus::Completed;
            job.result = Some(report);
            job.error = None;
        });
    }

    /// Transitions the job to `Failed` with a message.
    ///
    /// Ignored if the job is already terminal.
    pub fn fail(&self, id: Uuid, message: impl Into<String>) {
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(message.into());
            job.result = None;
        });
    }

    /// Requests cancellation of a job.
    pub fn request_cancel(&self, id: Uuid) -> CancelOutcome {
        let mut jobs = self.write();
        match jobs.get_mut(&id) {
            None => CancelOutcome::NotFound,
            Some(record) if record.job.status.is_terminal() => CancelOutcome::AlreadyTerminal,
            Some(record) => {
                record.cancel_requested = true;
                CancelOutcome::Accepted
            }
        }
    }

    /// Whether cancellation has been requested for a job.
    pub fn cancel_requested(&self, id: Uuid) -> bool {
        self.read()
            .get(&id)
            .map(|record| record.cancel_requested)
            .unwrap_or(false)
    }

    /// Applies `f` to the job unless it is unknown or already terminal,
    /// refreshing `updated_at` on change.
    fn update(&self, id: Uuid, f: impl FnOnce(&mut Job)) {
        let mut jobs = self.write();
        if let Some(record) = jobs.get_mut(&id) {
            if record.job.status.is_terminal() {
                return;
            }
            f(&mut record.job);
            record.job.updated_at = Utc::now();
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, JobRecord>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, JobRecord>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}
