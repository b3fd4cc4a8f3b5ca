//! Outbound mail abstractions.
//!
//! Handlers render a [`MailTemplate`] into a [`MailMessage`] and hand it to a
//! [`MailTransport`]. Production uses [`SmtpMailTransport`]; when no SMTP
//! credentials are configured the service falls back to [`LogMailTransport`],
//! which logs the message instead of delivering it.

mod smtp;

pub use smtp::{SmtpConfig, SmtpMailTransport};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::otp::Purpose;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid mailbox address: {0}")]
    InvalidAddress(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
    #[error("mail transport timed out")]
    Timeout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Plaintext templates for passcode emails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MailTemplate {
    Registration,
    PasswordReset,
}

impl MailTemplate {
    #[must_use]
    pub const fn purpose(self) -> Purpose {
        match self {
            Self::Registration => Purpose::Registration,
            Self::PasswordReset => Purpose::PasswordReset,
        }
    }

    /// Message returned to the caller once the email is on its way.
    #[must_use]
    pub const fn sent_message(self) -> &'static str {
        match self {
            Self::Registration => "OTP sent for registration",
            Self::PasswordReset => "OTP sent for password reset",
        }
    }

    #[must_use]
    pub fn render(self, brand: &str, to: &str, code: &str) -> MailMessage {
        let (subject, body) = match self {
            Self::Registration => (
                format!("Welcome to {brand}"),
                format!("Use this OTP to complete your registration: {code}"),
            ),
            Self::PasswordReset => (
                format!("{brand} Password Reset"),
                format!("Use this OTP to reset your password: {code}"),
            ),
        };

        MailMessage {
            to: to.to_string(),
            subject,
            body,
        }
    }
}

/// Mail delivery abstraction used by the passcode handlers.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver a message or return an error describing why it was not sent.
    async fn send(&self, message: &MailMessage) -> Result<(), Error>;
}

/// Local dev transport that logs the message instead of sending real email.
///
/// Digits in the body are masked so passcodes never reach the logs.
#[derive(Clone, Debug)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), Error> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %mask_digits(&message.body),
            "mail transport send stub"
        );
        Ok(())
    }
}

fn mask_digits(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_digit() { '*' } else { c })
        .collect()
}
