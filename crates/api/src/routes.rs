use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use swingdesk_core::config::Settings;
use swingdesk_core::domain::analysis::RunResult;
use swingdesk_core::llm::error::log_provider_diagnostics;
use swingdesk_core::pipeline::Orchestrator;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// The startup error, rendered, when the pipeline could not be built.
    pub orchestrator: Result<Arc<Orchestrator>, String>,
}

impl AppState {
    pub fn new(settings: Settings, orchestrator: anyhow::Result<Orchestrator>) -> Self {
        let orchestrator = orchestrator.map(Arc::new).map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "analysis pipeline unavailable; starting API in degraded mode");
            format!("{e:#}")
        });
        Self {
            settings: Arc::new(settings),
            orchestrator,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/analyze", post(analyze))
        .route("/cron/trigger", get(cron_trigger))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal(err: &anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

async fn healthz() -> &'static str {
    "ok"
}

/// Symbols from an `{"stocks": [...]}` body. Non-string entries (numeric exchange codes)
/// are kept as their JSON text.
fn symbols_from_body(body: Option<&Value>) -> Result<Vec<String>, ApiError> {
    let Some(Value::Array(stocks)) = body.and_then(|b| b.get("stocks")) else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "request body must contain a \"stocks\" array",
        ));
    };

    Ok(stocks
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}

fn pipeline(state: &AppState) -> Result<Arc<Orchestrator>, ApiError> {
    state.orchestrator.clone().map_err(|startup_error| {
        tracing::error!(error = %startup_error, "analysis requested but the pipeline is unavailable");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, startup_error)
    })
}

fn run_failed(err: anyhow::Error, what: &str) -> ApiError {
    sentry_anyhow::capture_anyhow(&err);
    log_provider_diagnostics(&err);
    tracing::error!(error = %err, "{what} failed");
    ApiError::internal(&err)
}

async fn analyze(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<RunResult>, ApiError> {
    let symbols = symbols_from_body(body.as_ref().map(|Json(v)| v))?;
    let orchestrator = pipeline(&state)?;

    tracing::info!(symbols = ?symbols, "analysis requested");
    let run = orchestrator
        .analyze(&symbols)
        .await
        .map_err(|e| run_failed(e, "analysis run"))?;

    Ok(Json(run))
}

#[derive(Debug, Serialize)]
struct CronSummary {
    message: String,
    analyzed: usize,
    symbols: Vec<String>,
    timestamp: DateTime<Utc>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn cron_trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CronSummary>, ApiError> {
    let secret = state
        .settings
        .require_cron_secret()
        .map_err(|e| ApiError::internal(&e))?;
    if bearer_token(&headers) != Some(secret) {
        tracing::warn!("cron trigger rejected: bad or missing bearer token");
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized"));
    }

    let orchestrator = pipeline(&state)?;
    let symbols = state.settings.default_symbols.clone();

    tracing::info!(symbols = ?symbols, "cron analysis triggered");
    let run = orchestrator
        .analyze(&symbols)
        .await
        .map_err(|e| run_failed(e, "cron analysis run"))?;

    Ok(Json(CronSummary {
        message: run.message,
        analyzed: run.results.len(),
        symbols,
        timestamp: run.timestamp,
    }))
}
