//! Identity provider integration.
//!
//! The service never stores accounts itself. It asks the provider whether an
//! email is registered and asks it to change a password once a reset has been
//! authorized. [`IdentityToolkit`] speaks to Firebase Authentication through
//! the Identity Toolkit REST API, either with a service account or against the
//! local Auth emulator.

mod credentials;
mod toolkit;

pub use credentials::ServiceAccount;
pub use toolkit::{IdentityToolkit, ToolkitConfig};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("user not found")]
    NotFound,
    #[error("identity provider request failed: {0}")]
    Upstream(String),
    #[error("identity provider request timed out")]
    Timeout,
    #[error("identity provider credentials rejected: {0}")]
    Credentials(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Upstream(err.without_url().to_string())
        }
    }
}

/// Account lookups and password updates delegated to the provider of record.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Find the account registered for `email`.
    async fn find_user(&self, email: &str) -> Result<User, Error>;

    /// Replace the password of the account identified by `uid`.
    async fn set_password(&self, uid: &str, new_password: &str) -> Result<(), Error>;
}
