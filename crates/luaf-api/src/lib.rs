//! Capability registry for LuaFramework extensions.
//!
//! An extension receives a capability table from the core module in its entry
//! point, stores it in a process slot and from then on reaches the core
//! through [`Api`]:
//!
//! - [`ApiSlot`]: write-once slot; [`v1`] and [`v2`] hold the process slots.
//! - [`Api`]: logging, the shared function namespace and, for the second
//!   generation, interpreter locking, introspection and input.
//! - [`FunctionKey`]: a name bound to its function signature.
//! - [`mod@log`]: `trace!` .. `error!` macros rendering into a stack buffer.
//! - [`layer`]: a `tracing` layer forwarding to the core's log.
//! - [`declare_extension!`]: exports the entry points.
//!
//! # Example
//!
//! ```
//! use luaf_api::{ApiSlot, ApiV2};
//! use luaf_abi::gen2;
//! use luaf_errors::ApiError;
//!
//! static SLOT: ApiSlot<gen2::CoreApiParam> = ApiSlot::new();
//!
//! // SAFETY: null is rejected before any read.
//! let err = unsafe { SLOT.initialize(std::ptr::null()) }.unwrap_err();
//! assert_eq!(err, ApiError::NullTable);
//! assert_eq!(SLOT.get().unwrap_err(), ApiError::NotInitialized);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod entry;
pub mod key;
#[cfg(feature = "layer")]
#[cfg_attr(docsrs, doc(cfg(feature = "layer")))]
pub mod layer;
pub mod log;
pub mod prelude;
mod process;
pub mod slot;

pub use api::{Api, ApiV1, ApiV2, Controller, Functions, Input, Keyboard, Lua};
pub use key::FunctionKey;
pub use process::{v1, v2};
pub use slot::ApiSlot;

#[doc(hidden)]
pub mod __private {
    pub use luaf_abi::{LogLevel, VersionedTable};
}
