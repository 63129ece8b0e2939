//! Bounded polling waits

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::browser::{BrowserSession, Locator};
use crate::common::{Error, Result};

/// Floor for the polling interval so a zero setting cannot spin on the driver
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll `probe` every `interval` until it yields a value or `timeout` passes
///
/// The probe always runs at least once, even with a zero timeout. Intervals
/// below [`MIN_POLL_INTERVAL`] are raised to it.
pub async fn until<T, F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let interval = interval.max(MIN_POLL_INTERVAL);
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(Error::Timeout(timeout));
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Wait until at least one element matches `locator`
///
/// Lookup errors count as "not yet present".
pub async fn element_present<S: BrowserSession>(
    session: &S,
    locator: &Locator,
    timeout: Duration,
    interval: Duration,
) -> Result<usize> {
    until(timeout, interval, move || async move {
        match session.find_all(locator).await {
            Ok(found) if !found.is_empty() => Some(found.len()),
            _ => None,
        }
    })
    .await
}
