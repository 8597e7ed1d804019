// SPDX-License-Identifier: PMPL-1.0-or-later
//! recordlog API
//!
//! HTTP produce/consume surface over a [`RecordLog`].
//!
//! - `POST /` with `{"record": {"value": "<base64>"}}` appends a record and
//!   returns `{"offset": N}`.
//! - `GET /` with `{"offset": N}` returns
//!   `{"record": {"offset": N, "value": "<base64>"}}`, or 404 when the offset
//!   does not exist.
//!
//! JSON keys are lowercase (`record`, `offset`, `value`). Clients written
//! against the older service, which sent `{"Offset": .., "Value": ..}`, need
//! to switch to the lowercase names; capitalized keys are not accepted.

pub mod config;
pub mod metrics;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use recordlog_store::{Log, LogError, LogResult, MemoryLog, Offset, RecordLog};

pub use config::{ApiConfig, ConfigError};
pub use metrics::ApiMetrics;

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<LogError> for ApiError {
    fn from(error: LogError) -> Self {
        if error.is_offset_out_of_range() {
            ApiError::NotFound(error.to_string())
        } else {
            ApiError::Internal(error.to_string())
        }
    }
}

/// Errors that stop the server from starting or shutting down cleanly.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("log error: {0}")]
    Log(#[from] LogError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// A record on the wire. The payload travels as standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBody {
    /// Assigned offset; ignored on produce.
    #[serde(default)]
    pub offset: Offset,
    /// Record payload
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
}

/// Produce request
#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceRequest {
    pub record: RecordBody,
}

/// Produce response
#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceResponse {
    pub offset: Offset,
}

/// Consume request
#[derive(Debug, Serialize, Deserialize)]
pub struct ConsumeRequest {
    pub offset: Offset,
}

/// Consume response
#[derive(Debug, Serialize, Deserialize)]
pub struct ConsumeResponse {
    pub record: RecordBody,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub records: u64,
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub start_time: Instant,
    pub log: Arc<dyn RecordLog>,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    pub fn new(log: Arc<dyn RecordLog>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            start_time: Instant::now(),
            log,
            metrics: Arc::new(ApiMetrics::new()?),
        })
    }
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Produce / consume
        .route("/", post(produce_handler).get(consume_handler))
        // Health and metrics
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Produce handler
#[instrument(skip(state, payload))]
async fn produce_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProduceRequest>, JsonRejection>,
) -> Result<Json<ProduceResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let value = request.record.value;
    let bytes = value.len() as u64;

    let log = Arc::clone(&state.log);
    let offset = run_blocking(move || log.append(&value)).await?;

    state.metrics.records_produced.inc();
    state.metrics.bytes_produced.inc_by(bytes);

    Ok(Json(ProduceResponse { offset }))
}

/// Consume handler
#[instrument(skip(state, payload))]
async fn consume_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConsumeRequest>, JsonRejection>,
) -> Result<Json<ConsumeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let offset = request.offset;

    let log = Arc::clone(&state.log);
    match run_blocking(move || log.read(offset)).await {
        Ok(value) => {
            state.metrics.records_consumed.inc();
            Ok(Json(ConsumeResponse {
                record: RecordBody { offset, value },
            }))
        }
        Err(error @ ApiError::NotFound(_)) => {
            state.metrics.offsets_not_found.inc();
            Err(error)
        }
        Err(error) => Err(error),
    }
}

/// Health check handler
#[instrument(skip(state))]
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        records: state.log.len(),
    })
}

/// Readiness check handler
#[instrument]
async fn ready_handler() -> StatusCode {
    StatusCode::OK
}

/// Prometheus scrape handler
#[instrument(skip(state))]
async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state
        .metrics
        .records_stored
        .set(i64::try_from(state.log.len()).unwrap_or(i64::MAX));

    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

/// Run a blocking log operation off the async runtime.
async fn run_blocking<T, F>(operation: F) -> Result<T, ApiError>
where
    F: FnOnce() -> LogResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// Open the log selected by `config`: the durable file-backed log when a
/// data path is set, otherwise an in-memory log.
pub fn open_log(config: &ApiConfig) -> Result<Arc<dyn RecordLog>, LogError> {
    match &config.data_path {
        Some(path) => {
            info!(path = %path.display(), "Opening durable record log");
            Ok(Arc::new(Log::open(path, config.store.clone())?))
        }
        None => {
            warn!("RECORDLOG_DATA_PATH not set; records are kept in memory only");
            Ok(Arc::new(MemoryLog::new()))
        }
    }
}

/// Start the API server and run until Ctrl-C, then close the log.
pub async fn serve(config: ApiConfig) -> Result<(), ServerError> {
    let log = open_log(&config)?;
    let state = AppState::new(Arc::clone(&log))?;
    let app = build_router(state);

    let addr = config.bind_address();
    info!("Starting recordlog API server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing record log");
    tokio::task::spawn_blocking(move || log.close()).await??;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C; shutdown must be external");
        std::future::pending::<()>().await;
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
