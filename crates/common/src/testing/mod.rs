//! Testing utilities and helpers
//!
//! - **[`async_utils`]**: Waiting on background work
//! - **[`concurrency`]**: Barrier-released thread races
//!
//! ## Usage
//!
//! ```rust,ignore
//! use driverscope_common::testing::race_n;
//!
//! let outcomes = race_n(4, |index| index * 2);
//! assert_eq!(outcomes, vec![0, 2, 4, 6]);
//! ```

pub mod async_utils;
pub mod concurrency;

pub use async_utils::poll_until;
pub use concurrency::{race, race_n};
