//! HTTP API for the analysis service.
//!
//! Thin axum layer over the orchestrator:
//!
//! - `POST /analyses` submits a source and returns the job id
//! - `GET /analyses/{id}` reports queued/processing/completed/error
//! - `DELETE /analyses/{id}` requests cancellation
//! - `GET /healthz` liveness probe
//!
//! Envelope fields are camelCase; the report payload itself keeps its
//! snake_case field names.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::analysis::AggregatedReport;
use crate::jobs::{AnalysisOrchestrator, CancelOutcome, Job, JobStatus};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The orchestrator all requests go through.
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

/// Body of `POST /analyses`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Author URL to analyze.
    pub source: String,
}

/// Body returned by `POST /analyses`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: &'static str,
}

/// Status envelope returned by `GET /analyses/{id}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    #[serde(rename_all = "camelCase")]
    Queued { job_id: Uuid, status: &'static str },
    #[serde(rename_all = "camelCase")]
    Processing {
        job_id: Uuid,
        status: &'static str,
        progress: u8,
        items_processed: usize,
        total_items: usize,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        job_id: Uuid,
        status: &'static str,
        result: Box<AggregatedReport>,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        job_id: Uuid,
        status: &'static str,
        message: String,
    },
}

impl StatusResponse {
    fn from_job(job: Job) -> Self {
        match job.status {
            JobStatus::Queued => StatusResponse::Queued {
                job_id: job.id,
                status: "queued",
            },
            JobStatus::Running => StatusResponse::Processing {
                job_id: job.id,
                status: "processing",
                progress: job.progress_percent(),
                items_processed: job.items_processed,
                total_items: job.total_items,
            },
            JobStatus::Completed => StatusResponse::Completed {
                job_id: job.id,
                status: "completed",
                result: Box::new(job.result.unwrap_or_else(empty_report)),
            },
            JobStatus::Failed => StatusResponse::Error {
                job_id: job.id,
                status: "error",
                message: job
                    .error
                    .unwrap_or_else(|| "analysis failed".to_string()),
            },
        }
    }
}

/// A completed job always carries a report; this placeholder keeps the
/// response total if that invariant is ever violated.
fn empty_report() -> AggregatedReport {
    AggregatedReport {
        key_themes: Vec::new(),
        conclusion: String::new(),
        writing_style: "Unknown".to_string(),
        readability_score: 0.0,
        sentiment: crate::text::Sentiment::Neutral,
        documents_analyzed: 0,
        documents: Vec::new(),
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "status": "not_found" })),
    )
        .into_response()
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyses", post(submit_analysis))
        .route(
            "/analyses/:id",
            get(analysis_status).delete(cancel_analysis),
        )
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the API until the process stops.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "HTTP server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn submit_analysis(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    match state.orchestrator.submit(&request.source) {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                job_id,
                status: "queued",
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "status": "error", "message": e.to_string() })),
        )
            .into_response(),
    }
}

async fn analysis_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    // A malformed id is indistinguishable from an unknown one to callers.
    let Ok(job_id) = Uuid::parse_str(&id) else {
        return not_found();
    };

    match state.orchestrator.status(job_id) {
        Some(job) => Json(StatusResponse::from_job(job)).into_response(),
        None => not_found(),
    }
}

async fn cancel_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(job_id) = Uuid::parse_str(&id) else {
        return not_found();
    };

    match state.orchestrator.cancel(job_id) {
        CancelOutcome::Accepted => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "status": "cancelling" })),
        )
            .into_response(),
        CancelOutcome::NotFound => not_found(),
        CancelOutcome::AlreadyTerminal => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "status": "error",
                "message": "job already reached a terminal state"
            })),
        )
            .into_response(),
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
