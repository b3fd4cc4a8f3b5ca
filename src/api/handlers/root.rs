use axum::{response::IntoResponse, Json};

use super::types::RootResponse;

pub const LIVENESS_MESSAGE: &str = "OTP Server is running!";

// axum handler for /
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: LIVENESS_MESSAGE.to_string(),
    })
}
