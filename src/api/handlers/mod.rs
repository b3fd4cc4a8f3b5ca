//! API handlers and shared request validation.
//!
//! Passcode and password handlers share [`AuthState`]; the assistant handler
//! uses the [`crate::chat::ChatProxy`] extension.

pub mod ask;
pub mod health;
pub mod otp;
pub mod password;
pub mod root;
pub mod state;
pub mod types;

pub use state::AuthState;

use axum::{http::StatusCode, Json};
use regex::Regex;

use types::Outcome;

pub(crate) const MISSING_PAYLOAD: &str = "Missing payload";
pub(crate) const INVALID_EMAIL: &str = "Invalid email";

/// Lightweight email sanity check used before contacting any upstream.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

pub(crate) fn missing_payload() -> (StatusCode, Json<Outcome>) {
    (
        StatusCode::BAD_REQUEST,
        Json(Outcome::failure(MISSING_PAYLOAD)),
    )
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_simple() {
        assert!(valid_email("user@example.com"));
        assert!(valid_email("First.Last+tag@sub.example.co"));
    }

    #[test]
    fn valid_email_rejects_malformed() {
        assert!(!valid_email("user.example.com"));
        assert!(!valid_email("user@example"));
        assert!(!valid_email("user @example.com"));
        assert!(!valid_email(""));
    }
}
