//! Combination Routes

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use storage::SensorCombination;
use synthesis::ManualCombination;

use super::ListQuery;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;

/// List stored combinations
pub async fn list_combinations(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<SensorCombination>>> {
    let page = params.page(&state.validator)?;
    Ok(Json(state.repository.list_combinations(page).await?))
}

/// Score and store a caller-chosen tuple
pub async fn create_combination(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ManualCombination>,
) -> ApiResult<(StatusCode, Json<SensorCombination>)> {
    let combination = state.synthesis.add_manual(request).await?;
    metrics::counter!("biosensor_combinations_created_total", "source" => "manual").increment(1);
    Ok((StatusCode::CREATED, Json(combination)))
}

/// Query parameters for a synthesis run
#[derive(Debug, Deserialize)]
pub struct SynthesizeQuery {
    /// Requested cap on examined tuples; the configured default when absent
    pub max_combinations: Option<usize>,
}

/// Response for a synthesis run
#[derive(Debug, Serialize, Deserialize)]
pub struct SynthesizeResponse {
    pub success: bool,
    pub checked: usize,
    pub created: usize,
    pub truncated: bool,
    pub max_checked: usize,
    pub message: String,
}

/// Enumerate untried tuples and persist the new combinations
pub async fn synthesize(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SynthesizeQuery>,
) -> ApiResult<Json<SynthesizeResponse>> {
    let limits = &state.settings.synthesis;
    let requested = params.max_combinations.unwrap_or(limits.default_request);
    state.validator.validate_range(
        "max_combinations",
        requested as f64,
        (1.0, limits.max_request as f64),
    )?;

    let started = Instant::now();
    let report = state.synthesis.run(requested).await?;

    metrics::counter!("biosensor_synthesis_runs_total").increment(1);
    metrics::counter!("biosensor_combinations_created_total", "source" => "synthesis")
        .increment(report.created as u64);
    metrics::histogram!("biosensor_synthesis_duration_seconds")
        .record(started.elapsed().as_secs_f64());

    let mut message = format!(
        "Checked {} possible combinations, created {} new ones",
        report.checked, report.created
    );
    if report.truncated {
        message.push_str(&format!(
            "; stopped at the cap of {}, run again to continue",
            report.max_checked
        ));
    }

    Ok(Json(SynthesizeResponse {
        success: true,
        checked: report.checked,
        created: report.created,
        truncated: report.truncated,
        max_checked: report.max_checked,
        message,
    }))
}
