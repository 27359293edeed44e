//! Binding of asynchronous completions to metrics
//!
//! A [`CompletionSourceWithMetrics`] is created when an operation is issued
//! and resolved by whichever task observes its outcome. Exactly one of the
//! success path (timer stopped, waiter gets the value) or the failure path
//! (timer discarded, failure counted, waiter gets the error) runs, no matter
//! how many tasks race to resolve it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll};

use driverscope_domain::{DriverError, TableMeta};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

use crate::manager::MetricsManager;
use crate::timer::ScopedTimerContext;

const PENDING: u8 = 0;
const SUCCEEDED: u8 = 1;
const FAILED: u8 = 2;

/// Resolution state of a completion source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Pending,
    Succeeded,
    Failed,
}

struct Unresolved<T> {
    sender: oneshot::Sender<Result<T, DriverError>>,
    timer: Option<ScopedTimerContext>,
}

/// Producer side of an instrumented operation
///
/// Dropping a source that is still pending resolves it as
/// [`DriverError::Cancelled`], which is counted like any other failure.
pub struct CompletionSourceWithMetrics<T> {
    state: AtomicU8,
    pending: Mutex<Option<Unresolved<T>>>,
    manager: MetricsManager,
}

impl<T> CompletionSourceWithMetrics<T> {
    /// Bind an operation to an already started timer (or none)
    pub fn new(
        manager: &MetricsManager,
        timer: Option<ScopedTimerContext>,
    ) -> (Self, MetricsCompletion<T>) {
        let (sender, receiver) = oneshot::channel();
        let source = Self {
            state: AtomicU8::new(PENDING),
            pending: Mutex::new(Some(Unresolved { sender, timer })),
            manager: manager.clone(),
        };
        (source, MetricsCompletion { receiver })
    }

    /// Bind a request against `target`, starting its request timer now
    pub fn for_request(
        manager: &MetricsManager,
        target: Option<&TableMeta>,
    ) -> (Self, MetricsCompletion<T>) {
        Self::new(manager, manager.start_request_timer(target))
    }

    /// Resolve with a value; `false` if already resolved
    pub fn try_set_result(&self, value: T) -> bool {
        if !self.transition(SUCCEEDED) {
            return false;
        }
        let Some(Unresolved { sender, timer }) = self.pending.lock().take() else {
            return false;
        };
        if let Some(mut timer) = timer {
            timer.stop();
        }
        if sender.send(Ok(value)).is_err() {
            trace!("Completion waiter dropped before success was delivered");
        }
        true
    }

    /// Resolve with a failure; `false` if already resolved
    ///
    /// The error reaches the waiter unchanged after it has been counted.
    pub fn try_set_error(&self, error: DriverError) -> bool {
        if !self.transition(FAILED) {
            return false;
        }
        let Some(Unresolved { sender, timer }) = self.pending.lock().take() else {
            return false;
        };
        if let Some(timer) = timer {
            timer.discard();
        }
        self.manager.report_failure(&error);
        if sender.send(Err(error)).is_err() {
            trace!("Completion waiter dropped before failure was delivered");
        }
        true
    }

    pub fn state(&self) -> CompletionState {
        match self.state.load(Ordering::Acquire) {
            PENDING => CompletionState::Pending,
            SUCCEEDED => CompletionState::Succeeded,
            _ => CompletionState::Failed,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state() != CompletionState::Pending
    }

    fn transition(&self, to: u8) -> bool {
        self.state.compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }
}

impl<T> Drop for CompletionSourceWithMetrics<T> {
    fn drop(&mut self) {
        if self.try_set_error(DriverError::Cancelled) {
            trace!("Pending completion dropped; counted as cancelled");
        }
    }
}

impl<T> fmt::Debug for CompletionSourceWithMetrics<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSourceWithMetrics").field("state", &self.state()).finish()
    }
}

/// Waiter side of an instrumented operation
///
/// Resolves to the value or error handed to the source, or to
/// [`DriverError::Cancelled`] if the source vanished without one.
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct MetricsCompletion<T> {
    receiver: oneshot::Receiver<Result<T, DriverError>>,
}

impl<T> Future for MetricsCompletion<T> {
    type Output = Result<T, DriverError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(DriverError::Cancelled)))
    }
}
