//! # Passgate
//!
//! `passgate` is a small backend for a storefront. It owns one piece of state,
//! the one-time passcodes it emails for registration and password reset, and
//! delegates everything else:
//!
//! - **Accounts** live in Firebase Authentication. The service only asks whether
//!   an email is registered and, once a reset is authorized, sets a new password
//!   through the Identity Toolkit REST API ([`identity`]).
//! - **Email** goes out over SMTP ([`mail`]). Without SMTP credentials the
//!   messages are logged instead.
//! - **Assistant answers** come from Gemini. Each question is sent together with
//!   the first 3000 characters of a local guide document ([`chat`]).
//!
//! ## Passcodes
//!
//! Codes are six digits, expire after a configurable TTL, and are bound to the
//! email they were sent to. A new code replaces any outstanding one for that
//! address and a code verifies at most once ([`otp`]).
//!
//! ## Password reset
//!
//! Verifying a password reset code returns a single-use reset token. The token
//! is scoped to the email, short lived, and required by `/reset-password`, so a
//! password can only change after the owner of the mailbox proved access to it.

pub mod api;
pub mod chat;
pub mod cli;
pub mod identity;
pub mod mail;
pub mod otp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
