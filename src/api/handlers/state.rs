//! Shared state for the passcode and password routes.

use std::sync::Arc;

use crate::identity::IdentityProvider;
use crate::mail::MailTransport;
use crate::otp::{OtpManager, ResetGrants};

pub struct AuthState {
    otp: Arc<OtpManager>,
    grants: Arc<ResetGrants>,
    identity: Arc<dyn IdentityProvider>,
    mail: Arc<dyn MailTransport>,
    brand: String,
}

impl AuthState {
    #[must_use]
    pub fn new(
        otp: Arc<OtpManager>,
        grants: Arc<ResetGrants>,
        identity: Arc<dyn IdentityProvider>,
        mail: Arc<dyn MailTransport>,
        brand: String,
    ) -> Self {
        Self {
            otp,
            grants,
            identity,
            mail,
            brand,
        }
    }

    #[must_use]
    pub fn otp(&self) -> &Arc<OtpManager> {
        &self.otp
    }

    #[must_use]
    pub fn grants(&self) -> &Arc<ResetGrants> {
        &self.grants
    }

    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn mail(&self) -> &dyn MailTransport {
        self.mail.as_ref()
    }

    /// Brand name used in email subjects.
    #[must_use]
    pub fn brand(&self) -> &str {
        &self.brand
    }
}
