//! Prediction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use waterlog_core::{FeatureInput, PredictionResult};

use crate::{AppResult, AppState};

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<FeatureInput>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    let Json(input) = payload?;
    if state.config.strict_validation {
        input.validate(state.config.crop_set)?;
    }
    let result = state.service.predict(&input)?;
    tracing::debug!(
        risk_label = %result.risk_label,
        confidence = result.confidence,
        "prediction served"
    );
    Ok(Json(result))
}
