//! Health and Metrics Routes

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use storage::TableCounts;

use crate::AppState;

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when storage cannot be read
    pub status: String,
    pub message: String,
    pub timestamp: i64,
    pub version: String,
    pub uptime_seconds: i64,
    pub counts: Option<TableCounts>,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let counts = match state.repository.table_counts().await {
        Ok(counts) => Some(counts),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read storage");
            None
        }
    };

    let (status, message) = if counts.is_some() {
        ("ok", "API is running")
    } else {
        ("degraded", "Storage unavailable")
    };

    Json(HealthResponse {
        status: status.to_string(),
        message: message.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        counts,
    })
}

/// Prometheus text exposition
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            "metrics recorder not installed\n".to_string(),
        ),
    }
}
