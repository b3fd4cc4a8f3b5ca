use super::{
    missing_payload,
    types::{Outcome, ResetPasswordRequest},
    AuthState,
};
use crate::identity;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub const MIN_PASSWORD_CHARS: usize = 6;

pub const PASSWORD_UPDATED: &str = "Password updated successfully";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";
pub const EMAIL_NOT_FOUND: &str = "Email not found";
pub const PASSWORD_UPDATE_FAILED: &str = "Password update failed";

#[utoipa::path(
    post,
    path= "/reset-password",
    request_body = ResetPasswordRequest,
    responses (
        (status = 200, description = "Password updated, or refused with `success: false`", body = Outcome, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = Outcome),
    ),
    tag= "password"
)]
#[instrument(skip(state, payload))]
pub async fn reset_password(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return missing_payload(),
    };

    debug!("reset request: {:?}", request);

    // must run before the grant is consumed
    if request.new_password.chars().count() < MIN_PASSWORD_CHARS {
        return (StatusCode::OK, Json(Outcome::failure(PASSWORD_TOO_SHORT)));
    }

    if !state
        .grants()
        .consume(&request.email, &request.reset_token)
        .await
    {
        debug!("reset grant rejected");
        return (StatusCode::OK, Json(Outcome::failure(INVALID_RESET_TOKEN)));
    }

    let user = match state.identity().find_user(&request.email).await {
        Ok(user) => user,
        Err(identity::Error::NotFound) => {
            return (StatusCode::OK, Json(Outcome::failure(EMAIL_NOT_FOUND)));
        }
        Err(e) => {
            error!("Error looking up account: {}", e);
            return (StatusCode::OK, Json(Outcome::failure(PASSWORD_UPDATE_FAILED)));
        }
    };

    match state
        .identity()
        .set_password(&user.uid, &request.new_password)
        .await
    {
        Ok(()) => {
            info!(uid = %user.uid, "password updated");
            (StatusCode::OK, Json(Outcome::ok(PASSWORD_UPDATED)))
        }
        Err(e) => {
            error!("Error updating password: {}", e);
            (StatusCode::OK, Json(Outcome::failure(PASSWORD_UPDATE_FAILED)))
        }
    }
}
