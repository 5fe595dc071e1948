//! Centralized error types for the LuaFramework bridge.
//!
//! The bridge has four distinct failure surfaces and each gets its own
//! error type:
//!
//! - [`api`]: misuse of the capability registry (double initialization, null
//!   table, use before initialization, log rendering failures). These are
//!   programming errors and are never recoverable at runtime.
//! - [`abi`]: a capability table whose versioned header does not match the
//!   generation the consumer was built against.
//! - [`attach`]: failures while the forwarding stub attaches the core module
//!   to the host process. Most of these are benign or soft.
//! - [`host`]: failures on the table owner side, mostly while loading
//!   extension libraries.
//!
//! Every error reports an [`ErrorSeverity`]; callers choose their log level
//! from it.
//!
//! # Example
//!
//! ```
//! use luaf_errors::{AttachError, ErrorSeverity};
//!
//! let err = AttachError::search_path("lua_framework/bin", "not found");
//! assert_eq!(err.severity(), ErrorSeverity::Warning);
//! assert!(err.is_soft());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod abi;
pub mod api;
pub mod attach;
pub mod host;
pub mod severity;

pub use abi::AbiError;
pub use api::{ApiError, ApiErrorKind};
pub use attach::AttachError;
pub use host::HostError;
pub use severity::ErrorSeverity;

/// A specialized `Result` type for registry operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
