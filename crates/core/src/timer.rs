//! Scoped timer contexts

use std::fmt;
use std::time::Duration;

use crate::ports::TimerHandle;

/// A running timer that records at most once
///
/// Calling [`stop`](Self::stop) more than once has no further effect.
/// Dropping a context that was never stopped stops it, so every exit path
/// releases the handle. Use [`discard`](Self::discard) when the measurement
/// must not be recorded.
#[must_use = "dropping the context immediately records a near-zero duration"]
pub struct ScopedTimerContext {
    handle: Option<Box<dyn TimerHandle>>,
}

impl ScopedTimerContext {
    pub fn new(handle: Box<dyn TimerHandle>) -> Self {
        Self { handle: Some(handle) }
    }

    /// Record the elapsed time; later calls are no-ops
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }

    /// Release the timer without recording anything
    pub fn discard(mut self) {
        self.handle = None;
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }

    /// Elapsed time so far, `None` once stopped or discarded
    pub fn elapsed(&self) -> Option<Duration> {
        self.handle.as_ref().map(|handle| handle.elapsed())
    }
}

impl Drop for ScopedTimerContext {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for ScopedTimerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedTimerContext").field("stopped", &self.is_stopped()).finish()
    }
}
