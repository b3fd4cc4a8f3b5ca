//! One-time passcode lifecycle.
//!
//! Codes are six digit strings bound to an email address. A code is consumed by
//! the first matching verification, replaced by a newer issuance for the same
//! address, and rejected once its TTL has elapsed. The registration and
//! password-reset flows share one store; each entry remembers which flow issued
//! it so only a reset code can mint a grant in [`ResetGrants`].

mod code;
mod grant;
mod store;
mod sweeper;

pub use code::{generate_code, CODE_MAX, CODE_MIN};
pub use grant::ResetGrants;
pub use store::{OtpConfig, OtpManager};
pub use sweeper::spawn_sweeper;

use std::time::{Duration, Instant};

/// Longest lifetime accepted for passcodes and reset grants.
pub const MAX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// TTLs above MAX_TTL are clamped so the deadline cannot overflow `Instant`.
pub(crate) fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Purpose {
    Registration,
    PasswordReset,
}

impl Purpose {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::PasswordReset => "password_reset",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    /// The code matched and has been consumed.
    Verified { purpose: Purpose },
    /// Unknown email, wrong code, or expired code.
    Rejected,
}

impl Verification {
    #[must_use]
    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_labels() {
        assert_eq!(Purpose::Registration.as_str(), "registration");
        assert_eq!(Purpose::PasswordReset.as_str(), "password_reset");
    }

    #[test]
    fn verification_is_verified() {
        assert!(Verification::Verified {
            purpose: Purpose::Registration
        }
        .is_verified());
        assert!(!Verification::Rejected.is_verified());
    }

    #[test]
    fn deadline_clamps_huge_ttl() {
        let now = Instant::now();
        assert_eq!(
            deadline(now, Duration::from_secs(30)),
            now + Duration::from_secs(30)
        );
        assert_eq!(deadline(now, Duration::MAX), now + MAX_TTL);
        assert_eq!(deadline(now, Duration::from_secs(u64::MAX)), now + MAX_TTL);
    }
}
