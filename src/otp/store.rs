//! In-memory passcode store keyed by email address.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::code::generate_code;
use super::{deadline, Purpose, Verification};

const DEFAULT_CODE_TTL_SECONDS: u64 = 10 * 60;
const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Clone, Copy, Debug)]
pub struct OtpConfig {
    code_ttl: Duration,
    max_entries: usize,
}

impl OtpConfig {
    /// Default store config: codes live 10 minutes, at most 10k pending codes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            code_ttl: Duration::from_secs(DEFAULT_CODE_TTL_SECONDS),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    #[must_use]
    pub fn with_code_ttl(mut self, ttl: Duration) -> Self {
        self.code_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_code_ttl_seconds(self, seconds: u64) -> Self {
        self.with_code_ttl(Duration::from_secs(seconds))
    }

    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    #[must_use]
    pub fn code_ttl(&self) -> Duration {
        self.code_ttl
    }

    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct OtpEntry {
    code: String,
    purpose: Purpose,
    expires_at: Instant,
}

impl OtpEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Issues and verifies single-use passcodes.
///
/// Each email has at most one outstanding code; issuing again replaces it.
/// Every operation holds the map lock for its whole read-modify-write, so
/// concurrent issue/verify calls for the same address are serialized.
#[derive(Debug)]
pub struct OtpManager {
    config: OtpConfig,
    entries: Mutex<HashMap<String, OtpEntry>>,
}

impl OtpManager {
    #[must_use]
    pub fn new(config: OtpConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Generate a fresh code for `email` and bind it, replacing any pending one.
    ///
    /// The email is used verbatim as the key; callers validate it beforehand.
    pub async fn issue(&self, email: &str, purpose: Purpose) -> String {
        let code = generate_code();
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        if !entries.contains_key(email) && entries.len() >= self.config.max_entries {
            make_room(&mut entries, now, self.config.max_entries);
        }

        entries.insert(
            email.to_string(),
            OtpEntry {
                code: code.clone(),
                purpose,
                expires_at: deadline(now, self.config.code_ttl),
            },
        );

        debug!(purpose = purpose.as_str(), "passcode issued");

        code
    }

    /// Check `submitted_code` against the pending code for `email`.
    ///
    /// A match consumes the entry. A mismatch leaves it untouched; an expired
    /// entry is dropped. Callers cannot tell those cases apart.
    pub async fn verify(&self, email: &str, submitted_code: &str) -> Verification {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let consumed = match entries.get(email) {
            None => return Verification::Rejected,
            Some(entry) if entry.is_expired(now) => None,
            Some(entry) if entry.code == submitted_code => Some(entry.purpose),
            Some(_) => return Verification::Rejected,
        };

        entries.remove(email);

        match consumed {
            Some(purpose) => Verification::Verified { purpose },
            None => {
                debug!("expired passcode dropped");
                Verification::Rejected
            }
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of pending codes, expired ones included until purged.
    pub async fn pending(&self) -> usize {
        self.entries.lock().await.len()
    }
}

// Purge expired entries first; if the store is still full, evict whatever expires soonest.
fn make_room(entries: &mut HashMap<String, OtpEntry>, now: Instant, max_entries: usize) {
    entries.retain(|_, entry| !entry.is_expired(now));

    while entries.len() >= max_entries {
        let Some(victim) = entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(email, _)| email.clone())
        else {
            break;
        };
        entries.remove(&victim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn manager() -> OtpManager {
        OtpManager::new(OtpConfig::new())
    }

    #[test]
    fn otp_config_defaults_and_overrides() {
        let config = OtpConfig::new();
        assert_eq!(config.code_ttl(), Duration::from_secs(600));
        assert_eq!(config.max_entries(), 10_000);

        let config = config.with_code_ttl_seconds(30).with_max_entries(0);
        assert_eq!(config.code_ttl(), Duration::from_secs(30));
        assert_eq!(config.max_entries(), 1);
    }

    #[tokio::test]
    async fn verify_unknown_email_is_rejected_without_state_change() {
        let otp = manager();
        assert_eq!(
            otp.verify("nobody@example.com", "123456").await,
            Verification::Rejected
        );
        assert_eq!(otp.pending().await, 0);
    }

    #[tokio::test]
    async fn issued_code_verifies_exactly_once() {
        let otp = manager();
        let code = otp.issue("a@x.com", Purpose::Registration).await;
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(
            otp.verify("a@x.com", &code).await,
            Verification::Verified {
                purpose: Purpose::Registration
            }
        );
        assert_eq!(otp.verify("a@x.com", &code).await, Verification::Rejected);
        assert_eq!(otp.pending().await, 0);
    }

    #[tokio::test]
    async fn reissue_replaces_previous_code() {
        let otp = manager();
        let first = otp.issue("a@x.com", Purpose::Registration).await;
        let mut second = otp.issue("a@x.com", Purpose::PasswordReset).await;
        // The draw may repeat; keep issuing until the codes differ.
        while second == first {
            second = otp.issue("a@x.com", Purpose::PasswordReset).await;
        }

        assert_eq!(otp.verify("a@x.com", &first).await, Verification::Rejected);
        assert_eq!(
            otp.verify("a@x.com", &second).await,
            Verification::Verified {
                purpose: Purpose::PasswordReset
            }
        );
    }

    #[tokio::test]
    async fn mismatch_keeps_pending_code() {
        let otp = manager();
        let code = otp.issue("a@x.com", Purpose::Registration).await;
        let wrong = if code == "123456" { "123457" } else { "123456" };

        assert_eq!(otp.verify("a@x.com", wrong).await, Verification::Rejected);
        assert_eq!(otp.pending().await, 1);
        assert!(otp.verify("a@x.com", &code).await.is_verified());
    }

    #[tokio::test]
    async fn verify_is_exact_match() {
        let otp = manager();
        let code = otp.issue("a@x.com", Purpose::Registration).await;

        assert!(!otp.verify("a@x.com", &format!(" {code}")).await.is_verified());
        assert!(!otp.verify("a@x.com", &format!("{code}0")).await.is_verified());
        assert!(!otp.verify("A@X.COM", &code).await.is_verified());
        assert!(otp.verify("a@x.com", &code).await.is_verified());
    }

    #[tokio::test]
    async fn expired_code_is_rejected_and_dropped() {
        let otp = OtpManager::new(OtpConfig::new().with_code_ttl(Duration::ZERO));
        let code = otp.issue("a@x.com", Purpose::Registration).await;

        assert_eq!(otp.verify("a@x.com", &code).await, Verification::Rejected);
        assert_eq!(otp.pending().await, 0);
    }

    #[tokio::test]
    async fn huge_ttl_does_not_overflow() {
        let otp = OtpManager::new(OtpConfig::new().with_code_ttl_seconds(u64::MAX));
        let code = otp.issue("a@x.com", Purpose::Registration).await;

        assert_eq!(otp.purge_expired().await, 0);
        assert!(otp.verify("a@x.com", &code).await.is_verified());
    }

    #[tokio::test]
    async fn purge_expired_removes_only_expired() {
        let expired = OtpManager::new(OtpConfig::new().with_code_ttl(Duration::ZERO));
        expired.issue("a@x.com", Purpose::Registration).await;
        expired.issue("b@x.com", Purpose::PasswordReset).await;
        assert_eq!(expired.purge_expired().await, 2);
        assert_eq!(expired.pending().await, 0);

        let live = manager();
        live.issue("a@x.com", Purpose::Registration).await;
        assert_eq!(live.purge_expired().await, 0);
        assert_eq!(live.pending().await, 1);
    }

    #[tokio::test]
    async fn full_store_evicts_soonest_expiring() {
        let otp = OtpManager::new(OtpConfig::new().with_max_entries(2));
        let first = otp.issue("first@x.com", Purpose::Registration).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = otp.issue("second@x.com", Purpose::Registration).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let third = otp.issue("third@x.com", Purpose::Registration).await;

        assert_eq!(otp.pending().await, 2);
        assert!(!otp.verify("first@x.com", &first).await.is_verified());
        assert!(otp.verify("second@x.com", &second).await.is_verified());
        assert!(otp.verify("third@x.com", &third).await.is_verified());
    }

    #[tokio::test]
    async fn reissue_on_full_store_does_not_evict_others() {
        let otp = OtpManager::new(OtpConfig::new().with_max_entries(2));
        let first = otp.issue("first@x.com", Purpose::Registration).await;
        otp.issue("second@x.com", Purpose::Registration).await;
        let second = otp.issue("second@x.com", Purpose::Registration).await;

        assert!(otp.verify("first@x.com", &first).await.is_verified());
        assert!(otp.verify("second@x.com", &second).await.is_verified());
    }

    #[tokio::test]
    async fn concurrent_verifies_consume_once() {
        let otp = Arc::new(manager());
        let code = otp.issue("race@x.com", Purpose::PasswordReset).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let otp = otp.clone();
            let code = code.clone();
            handles.push(tokio::spawn(async move {
                otp.verify("race@x.com", &code).await.is_verified()
            }));
        }

        let mut verified = 0;
        for handle in handles {
            if handle.await.unwrap_or(false) {
                verified += 1;
            }
        }
        assert_eq!(verified, 1);
    }
}
