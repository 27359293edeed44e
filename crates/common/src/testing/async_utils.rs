//! Async testing utilities
//!
//! Helpers for tests that wait on work completed by background tasks, such as
//! gauge samplers or completions resolved from another runtime worker.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Re-evaluate `condition` every `interval` until it holds or `timeout` passes
///
/// Returns whether the condition was observed to hold. The condition is
/// always checked at least once, even with a zero timeout.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep_until((Instant::now() + interval).min(deadline)).await;
    }
}
