//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use luaf_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_err, must_some, must_with};

#[cfg(feature = "tracking")]
pub use crate::tracking::{AllocationGuard, track};

#[cfg(feature = "mock")]
pub use crate::serial::serial;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
