use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::{OtpManager, ResetGrants};

/// Spawn a background task that evicts expired passcodes and reset grants.
///
/// Verification checks expiry on its own; the sweep only bounds memory.
pub fn spawn_sweeper(
    otp: Arc<OtpManager>,
    grants: Arc<ResetGrants>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    let interval = if interval.is_zero() {
        Duration::from_secs(1)
    } else {
        interval
    };

    tokio::spawn(async move {
        loop {
            sleep(interval).await;

            let codes = otp.purge_expired().await;
            let expired_grants = grants.purge_expired().await;
            if codes > 0 || expired_grants > 0 {
                debug!(codes, grants = expired_grants, "expired entries swept");
            }
        }
    })
}
