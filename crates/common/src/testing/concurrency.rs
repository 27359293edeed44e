//! Thread-level race helpers
//!
//! Start several closures behind a shared barrier so that they hit the code
//! under test as close to simultaneously as the scheduler allows.

#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Barrier};
use std::thread;

/// Run every closure on its own thread, releasing them together.
///
/// Results are returned in the order the closures were given.
///
/// # Examples
///
/// ```ignore
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// use driverscope_common::testing::concurrency::race;
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let a = Arc::clone(&hits);
/// let b = Arc::clone(&hits);
/// let results = race(vec![
///     Box::new(move || a.fetch_add(1, Ordering::SeqCst)) as Box<dyn FnOnce() -> usize + Send>,
///     Box::new(move || b.fetch_add(1, Ordering::SeqCst)),
/// ]);
/// assert_eq!(results.len(), 2);
/// assert_eq!(hits.load(Ordering::SeqCst), 2);
/// ```
pub fn race<T>(contenders: Vec<Box<dyn FnOnce() -> T + Send>>) -> Vec<T>
where
    T: Send + 'static,
{
    let barrier = Arc::new(Barrier::new(contenders.len()));

    let handles: Vec<_> = contenders
        .into_iter()
        .map(|contender| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                contender()
            })
        })
        .collect();

    handles.into_iter().map(|handle| handle.join().expect("race contender panicked")).collect()
}

/// Run `threads` copies of the same closure simultaneously.
pub fn race_n<T, F>(threads: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize) -> T + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let contenders = (0..threads)
        .map(|index| {
            let f = Arc::clone(&f);
            Box::new(move || f(index)) as Box<dyn FnOnce() -> T + Send>
        })
        .collect();
    race(contenders)
}
