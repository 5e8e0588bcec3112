//! Liveness message

use axum::Json;
use serde::Serialize;

pub const STATUS_MESSAGE: &str = "India Waterlogging Predictor API is running";

#[derive(Serialize)]
pub struct StatusResponse {
    message: &'static str,
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { message: STATUS_MESSAGE })
}
