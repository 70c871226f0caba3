//! Asynchronous analysis jobs.
//!
//! A submitted source becomes a [`Job`] tracked in the [`JobStore`] and
//! driven to a terminal state by a detached [`PipelineDriver`] task. The
//! [`AnalysisOrchestrator`] is the only entry point callers use: it
//! validates submissions, launches the driver, and answers status and
//! cancellation queries.

mod driver;
mod job;
mod orchestrator;
mod store;

pub use driver::{
    DriverConfig, PipelineDriver, ALL_FAILED_MESSAGE, CANCELLED_MESSAGE, NO_DOCUMENTS_MESSAGE,
};
pub use job::{Job, JobStatus};
pub use orchestrator::AnalysisOrchestrator;
pub use store::{CancelOutcome, JobStore};
