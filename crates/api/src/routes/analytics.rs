//! Analytics Routes

use analytics::{
    best_combinations as rank, comparative_analysis, statistics as compute_statistics,
    ComparativeAnalysis, DatabaseStatistics, RankedCombination, DEFAULT_BEST_LIMIT,
    MAX_BEST_LIMIT,
};
use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;
use storage::Page;

use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::AppState;

/// Database-wide counts, coverage and score distribution
pub async fn statistics(State(state): State<AppState>) -> ApiResult<Json<DatabaseStatistics>> {
    let counts = state.repository.table_counts().await?;
    let combinations = state.repository.list_combinations(Page::all()).await?;
    Ok(Json(compute_statistics(counts, &combinations)))
}

/// Query parameters for best combinations
#[derive(Debug, Deserialize)]
pub struct BestQuery {
    #[serde(default = "default_best_limit")]
    pub limit: usize,
}

fn default_best_limit() -> usize {
    DEFAULT_BEST_LIMIT
}

/// Highest-scoring combinations with component names
pub async fn best_combinations(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BestQuery>,
) -> ApiResult<Json<Vec<RankedCombination>>> {
    state
        .validator
        .validate_range("limit", params.limit as f64, (1.0, MAX_BEST_LIMIT as f64))?;

    let catalog = state.repository.load_catalog().await?;
    let combinations = state.repository.list_combinations(Page::all()).await?;
    Ok(Json(rank(&catalog, &combinations, params.limit)))
}

/// Per-layer averages and per-component mean scores
pub async fn comparative(State(state): State<AppState>) -> ApiResult<Json<ComparativeAnalysis>> {
    let catalog = state.repository.load_catalog().await?;
    let combinations = state.repository.list_combinations(Page::all()).await?;
    Ok(Json(comparative_analysis(&catalog, &combinations)))
}
