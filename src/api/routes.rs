use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{FEATURE_COUNT, SCHEMA_VERSION};
use crate::observability::MetricsRegistry;
use crate::scoring::ScoringPipeline;

use super::request::ScoreRequest;
use super::response::{ErrorResponse, HealthResponse, ReadyResponse, ScoreResponse};

/// Shared application state.
pub struct AppState {
    /// Scoring pipeline over the loaded model
    pub pipeline: Arc<ScoringPipeline>,

    /// Metrics registry
    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,

    /// Latency budget in milliseconds
    pub latency_budget_ms: u64,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/score", post(handle_score))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle batch score requests.
async fn handle_score(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> axum::response::Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let batch_size = req.transactions.len();

    let transactions = match req.into_transactions() {
        Ok(txs) => txs,
        Err(message) => {
            state.metrics.record_validation_failure();
            warn!(%request_id, error = %message, "score request rejected");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(message)),
            )
                .into_response();
        }
    };

    let predictions = match state.pipeline.score_batch(&transactions) {
        Ok(predictions) => predictions,
        Err(e) => {
            state.metrics.record_model_error();
            warn!(%request_id, error = %e, "model inference failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("model inference failed")),
            )
                .into_response();
        }
    };

    let overrides = ScoringPipeline::override_count(&predictions);
    state.metrics.record_batch(&predictions, overrides);
    state.metrics.record_latency(start);

    let elapsed = start.elapsed();
    if elapsed.as_millis() > state.latency_budget_ms as u128 {
        warn!(
            %request_id,
            batch_size,
            latency_ms = elapsed.as_millis(),
            budget_ms = state.latency_budget_ms,
            "score latency exceeded budget"
        );
    }

    info!(
        %request_id,
        batch_size,
        overrides,
        latency_ms = elapsed.as_millis(),
        "score completed"
    );

    (StatusCode::OK, Json(ScoreResponse { results: predictions })).into_response()
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint.
async fn handle_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ReadyResponse {
        ready: true,
        model: state.pipeline.scorer_name().to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        policy_version: state.pipeline.engine().policy().version.clone(),
        feature_count: FEATURE_COUNT,
    })
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        state.metrics.to_prometheus(),
    )
}
