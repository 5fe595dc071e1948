//! Prelude module for extension code.
//!
//! ```
//! use luaf_api::prelude::*;
//!
//! assert!(matches!(v2::get(), Err(ApiError::NotInitialized)));
//! ```

pub use crate::{Api, ApiSlot, ApiV1, ApiV2, FunctionKey, v1, v2};
pub use luaf_abi::{ControllerButton, KeyCode, LogLevel};
pub use luaf_errors::{ApiError, ApiResult};
