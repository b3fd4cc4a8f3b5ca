//! Passcode issuance and verification routes.
//!
//! `/send-otp` refuses emails that already have an account, `/send-reset-otp`
//! issues unconditionally, and `/verify-otp` consumes a code. Verifying a
//! password reset code also mints the single-use grant that `/reset-password`
//! requires.

use super::{
    missing_payload, valid_email,
    types::{OtpRequest, Outcome, VerifyOtpRequest, VerifyOtpResponse},
    AuthState, INVALID_EMAIL,
};
use crate::{
    identity,
    mail::MailTemplate,
    otp::{Purpose, Verification},
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub const EMAIL_REGISTERED: &str = "Email is already registered";
pub const EMAIL_LOOKUP_FAILED: &str = "Could not check email registration";
pub const EMAIL_SEND_FAILED: &str = "Email sending failed";

#[utoipa::path(
    post,
    path= "/send-otp",
    request_body = OtpRequest,
    responses (
        (status = 200, description = "Registration code sent, or refused with `success: false`", body = Outcome, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = Outcome),
    ),
    tag= "otp"
)]
#[instrument(skip(state, payload))]
pub async fn send_otp(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<OtpRequest>>,
) -> impl IntoResponse {
    let request: OtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return missing_payload(),
    };

    if !valid_email(&request.email) {
        return (StatusCode::OK, Json(Outcome::failure(INVALID_EMAIL)));
    }

    match state.identity().find_user(&request.email).await {
        Ok(_) => {
            debug!("registration refused, account exists");
            return (StatusCode::OK, Json(Outcome::failure(EMAIL_REGISTERED)));
        }
        Err(identity::Error::NotFound) => (),
        Err(e) => {
            error!("Error looking up account: {}", e);
            return (StatusCode::OK, Json(Outcome::failure(EMAIL_LOOKUP_FAILED)));
        }
    }

    issue_and_send(&state, &request.email, MailTemplate::Registration).await
}

#[utoipa::path(
    post,
    path= "/send-reset-otp",
    request_body = OtpRequest,
    responses (
        (status = 200, description = "Reset code sent, or delivery failed with `success: false`", body = Outcome, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = Outcome),
    ),
    tag= "otp"
)]
#[instrument(skip(state, payload))]
pub async fn send_reset_otp(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<OtpRequest>>,
) -> impl IntoResponse {
    let request: OtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return missing_payload(),
    };

    if !valid_email(&request.email) {
        return (StatusCode::OK, Json(Outcome::failure(INVALID_EMAIL)));
    }

    issue_and_send(&state, &request.email, MailTemplate::PasswordReset).await
}

#[utoipa::path(
    post,
    path= "/verify-otp",
    request_body = VerifyOtpRequest,
    responses (
        (status = 200, description = "Verification result; reset codes also return `reset_token`", body = VerifyOtpResponse, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = VerifyOtpResponse),
    ),
    tag= "otp"
)]
#[instrument(skip(state, payload))]
pub async fn verify_otp(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let rejected = Json(VerifyOtpResponse {
        verified: false,
        reset_token: None,
    });

    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, rejected),
    };

    match state.otp().verify(&request.email, &request.otp).await {
        Verification::Rejected => {
            debug!("passcode rejected");
            (StatusCode::OK, rejected)
        }
        Verification::Verified {
            purpose: Purpose::Registration,
        } => (
            StatusCode::OK,
            Json(VerifyOtpResponse {
                verified: true,
                reset_token: None,
            }),
        ),
        Verification::Verified {
            purpose: Purpose::PasswordReset,
        } => match state.grants().issue(&request.email).await {
            Ok(token) => (
                StatusCode::OK,
                Json(VerifyOtpResponse {
                    verified: true,
                    reset_token: Some(token),
                }),
            ),
            Err(e) => {
                error!("Error issuing reset grant: {:?}", e);
                (StatusCode::OK, rejected)
            }
        },
    }
}

async fn issue_and_send(
    state: &AuthState,
    email: &str,
    template: MailTemplate,
) -> (StatusCode, Json<Outcome>) {
    let purpose = template.purpose();
    let code = state.otp().issue(email, purpose).await;
    let message = template.render(state.brand(), email, &code);

    match state.mail().send(&message).await {
        Ok(()) => {
            info!(purpose = purpose.as_str(), "passcode sent");
            (StatusCode::OK, Json(Outcome::ok(template.sent_message())))
        }
        Err(e) => {
            error!(purpose = purpose.as_str(), "Error sending passcode: {}", e);
            (StatusCode::OK, Json(Outcome::failure(EMAIL_SEND_FAILED)))
        }
    }
}
