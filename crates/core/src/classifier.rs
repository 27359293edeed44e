//! Failure classification
//!
//! Maps a failure to exactly one error counter. The match below has no
//! wildcard arm: adding a [`DriverError`] variant fails to compile until the
//! variant is placed in a bucket.

use std::error::Error as StdError;

use driverscope_domain::{DriverError, ErrorCounter};

/// Counter a driver failure is reported under
pub fn classify(error: &DriverError) -> ErrorCounter {
    match error {
        DriverError::WriteTimeout { .. } => ErrorCounter::WriteTimeout,
        DriverError::ReadTimeout { .. } => ErrorCounter::ReadTimeout,
        DriverError::OperationTimedOut { .. } => ErrorCounter::OperationTimedOut,
        DriverError::NoHostAvailable { .. } => ErrorCounter::NoHostAvailable,
        DriverError::Unavailable { .. } => ErrorCounter::Unavailable,
        DriverError::InvalidQuery(_)
        | DriverError::Authentication(_)
        | DriverError::Protocol(_)
        | DriverError::Overloaded(_)
        | DriverError::Cancelled
        | DriverError::External(_) => ErrorCounter::Other,
    }
}

/// Classify an arbitrary error
///
/// Walks the source chain looking for a [`DriverError`]; anything that does
/// not originate in the driver lands in [`ErrorCounter::Other`].
pub fn classify_any(error: &(dyn StdError + 'static)) -> ErrorCounter {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(driver) = err.downcast_ref::<DriverError>() {
            return classify(driver);
        }
        current = err.source();
    }
    ErrorCounter::Other
}
