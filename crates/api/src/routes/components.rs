//! Component Catalog Routes

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use data_validator::ValidationResult;
use storage::{
    BioRecognitionLayer, Component, ImmobilizationLayer, MemristiveLayer, TargetAnalyte,
};

use super::{ListQuery, SuccessResponse};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;

fn check(result: ValidationResult) -> ApiResult<()> {
    result.into_result().map_err(ApiError::Validation)
}

fn created<C: Component>(record: &C) -> (StatusCode, Json<SuccessResponse>) {
    metrics::counter!("biosensor_components_created_total", "kind" => C::KIND.as_str())
        .increment(1);
    tracing::info!(kind = %C::KIND, id = record.id(), "Component created");
    (
        StatusCode::CREATED,
        Json(SuccessResponse::ok(format!(
            "{} {} saved",
            C::KIND,
            record.id()
        ))),
    )
}

/// List target analytes
pub async fn list_analytes(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<TargetAnalyte>>> {
    let page = params.page(&state.validator)?;
    Ok(Json(state.repository.list_analytes(page).await?))
}

/// Create a target analyte
pub async fn create_analyte(
    State(state): State<AppState>,
    ApiJson(record): ApiJson<TargetAnalyte>,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    check(state.validator.validate_analyte(&record))?;
    state.repository.create_analyte(record.clone()).await?;
    Ok(created(&record))
}

/// List bio-recognition layers
pub async fn list_bio_recognition(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<BioRecognitionLayer>>> {
    let page = params.page(&state.validator)?;
    Ok(Json(state.repository.list_bio_recognition(page).await?))
}

/// Create a bio-recognition layer
pub async fn create_bio_recognition(
    State(state): State<AppState>,
    ApiJson(record): ApiJson<BioRecognitionLayer>,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    check(state.validator.validate_bio_recognition(&record))?;
    state.repository.create_bio_recognition(record.clone()).await?;
    Ok(created(&record))
}

/// List immobilization layers
pub async fn list_immobilization(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<ImmobilizationLayer>>> {
    let page = params.page(&state.validator)?;
    Ok(Json(state.repository.list_immobilization(page).await?))
}

/// Create an immobilization layer
pub async fn create_immobilization(
    State(state): State<AppState>,
    ApiJson(record): ApiJson<ImmobilizationLayer>,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    check(state.validator.validate_immobilization(&record))?;
    state.repository.create_immobilization(record.clone()).await?;
    Ok(created(&record))
}

/// List memristive layers
pub async fn list_memristive(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<MemristiveLayer>>> {
    let page = params.page(&state.validator)?;
    Ok(Json(state.repository.list_memristive(page).await?))
}

/// Create a memristive layer
pub async fn create_memristive(
    State(state): State<AppState>,
    ApiJson(record): ApiJson<MemristiveLayer>,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    check(state.validator.validate_memristive(&record))?;
    state.repository.create_memristive(record.clone()).await?;
    Ok(created(&record))
}
