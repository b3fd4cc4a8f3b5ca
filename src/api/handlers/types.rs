use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result envelope for the passcode and password routes.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    #[must_use]
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VerifyOtpResponse {
    pub verified: bool,
    /// Present only after verifying a password reset code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

impl std::fmt::Debug for VerifyOtpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyOtpResponse")
            .field("verified", &self.verified)
            .field("reset_token", &self.reset_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
    pub reset_token: String,
}

impl std::fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .field("new_password", &"***")
            .field("reset_token", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct AskRequest {
    #[serde(rename = "userQuestion", default)]
    pub user_question: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AskResponse {
    pub reply: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RootResponse {
    pub message: String,
}
