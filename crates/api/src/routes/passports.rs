//! Passport Routes
//!
//! A passport enters one component of each kind in a single request.

use axum::{extract::State, http::StatusCode, Json};
use storage::{ComponentKind, Passport};

use super::SuccessResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::AppState;

/// Validate and store all four components, or none of them
pub async fn create_passport(
    State(state): State<AppState>,
    ApiJson(passport): ApiJson<Passport>,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    state
        .validator
        .validate_passport(&passport)
        .into_result()
        .map_err(ApiError::Validation)?;

    let message = format!(
        "Passport saved: {} / {} / {} / {}",
        passport.analyte.ta_id,
        passport.bio_recognition.bre_id,
        passport.immobilization.im_id,
        passport.memristive.mem_id
    );
    state.repository.create_passport(passport).await?;

    for kind in ComponentKind::ALL {
        metrics::counter!("biosensor_components_created_total", "kind" => kind.as_str())
            .increment(1);
    }
    tracing::info!("{}", message);

    Ok((StatusCode::CREATED, Json(SuccessResponse::ok(message))))
}
