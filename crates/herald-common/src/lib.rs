//! # Herald Common
//!
//! Shared types, utilities, and common functionality for the Herald bot.
//!
//! This crate provides the error type, duration and colour helpers, and the
//! logging bootstrap used across all other crates in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

#[doc(hidden)]
pub use tracing;

pub mod error;
pub mod logging;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::*;
pub use logging::{init_logging, LoggingConfig};
pub use utils::*;
