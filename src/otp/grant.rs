//! Short-lived password reset grants.
//!
//! A grant is handed out when a password-reset passcode verifies and must be
//! presented, together with the same email, to change the password. Grants are
//! single use and only their SHA-256 digest is kept in memory.

use anyhow::Result;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::code::{generate_grant_token, hash_grant_token};
use super::deadline;

const DEFAULT_GRANT_TTL_SECONDS: u64 = 5 * 60;

#[derive(Debug)]
struct Grant {
    email: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ResetGrants {
    ttl: Duration,
    grants: Mutex<HashMap<Vec<u8>, Grant>>,
}

impl ResetGrants {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            grants: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a grant for `email`, revoking any grant previously issued for it.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub async fn issue(&self, email: &str) -> Result<String> {
        let token = generate_grant_token()?;
        let now = Instant::now();
        let mut grants = self.grants.lock().await;
        grants.retain(|_, grant| grant.email != email && now < grant.expires_at);
        grants.insert(
            hash_grant_token(&token),
            Grant {
                email: email.to_string(),
                expires_at: deadline(now, self.ttl),
            },
        );
        Ok(token)
    }

    /// Redeem `token` for `email`.
    ///
    /// A presented token is burned whether or not it matches the email.
    pub async fn consume(&self, email: &str, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }

        let Some(grant) = self.grants.lock().await.remove(&hash_grant_token(token)) else {
            return false;
        };

        if Instant::now() >= grant.expires_at {
            debug!("expired reset grant presented");
            return false;
        }

        grant.email == email
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut grants = self.grants.lock().await;
        let before = grants.len();
        grants.retain(|_, grant| now < grant.expires_at);
        before - grants.len()
    }

    pub async fn outstanding(&self) -> usize {
        self.grants.lock().await.len()
    }
}

impl Default for ResetGrants {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_GRANT_TTL_SECONDS))
    }
}
