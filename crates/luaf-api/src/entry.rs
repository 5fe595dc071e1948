//! Extension entry points.
//!
//! [`declare_extension!`](crate::declare_extension) exports both
//! `ExtInitialize` and `ExtInitializeVersioned` for one table generation,
//! fills the matching process slot and then runs the extension's own
//! initializer.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use luaf_abi::{CapabilityTable, LogLevel, return_code};
use luaf_errors::{ApiError, ApiResult};

use crate::api::Api;

/// Entry point return code for a registry error.
#[must_use]
pub fn error_code(err: &ApiError) -> i32 {
    match err {
        ApiError::NullTable => return_code::INVALID_ARG,
        ApiError::AlreadyInitialized => return_code::ALREADY_INITIALIZED,
        ApiError::NotInitialized => return_code::NOT_INITIALIZED,
        ApiError::Abi(_) => return_code::ABI_MISMATCH,
        ApiError::Format => return_code::ERROR,
    }
}

/// Finish an entry point: turn the slot initialization result and the
/// extension initializer's outcome into a return code.
///
/// Initializer failures and panics are reported through the registry's log
/// before returning [`return_code::ERROR`].
pub fn finish<T, E, F>(initialized: ApiResult<&'static Api<T>>, init: F) -> i32
where
    T: CapabilityTable,
    E: Display,
    F: FnOnce(&'static Api<T>) -> Result<(), E>,
{
    let api = match initialized {
        Ok(api) => api,
        Err(err) => {
            tracing::error!(
                error = %err,
                kind = ?err.kind(),
                severity = %err.severity(),
                "extension registry initialization failed"
            );
            return error_code(&err);
        }
    };

    match panic::catch_unwind(AssertUnwindSafe(|| init(api))) {
        Ok(Ok(())) => return_code::SUCCESS,
        Ok(Err(err)) => {
            api.log(LogLevel::Error, &format!("extension initialization failed: {err}"));
            return_code::ERROR
        }
        Err(_) => {
            api.log(LogLevel::Error, "extension initialization panicked");
            return_code::ERROR
        }
    }
}

/// Export the extension entry points for one table generation.
///
/// `$gen` is `v1` or `v2`; `$init` is a function or closure taking
/// `&'static Api<_>` and returning `Result<(), E: Display>`.
///
/// ```ignore
/// fn init(api: &'static luaf_api::ApiV2) -> Result<(), std::convert::Infallible> {
///     api.log(luaf_abi::LogLevel::Info, "hello from the extension");
///     Ok(())
/// }
///
/// luaf_api::declare_extension!(v2, init);
/// ```
#[macro_export]
macro_rules! declare_extension {
    ($gen:ident, $init:expr) => {
        /// Legacy extension entry point.
        ///
        /// # Safety
        ///
        /// `param` must be null or a table valid for the rest of the process.
        #[expect(unsafe_code, reason = "exported entry point")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn ExtInitialize(param: *const $crate::$gen::Table) -> i32 {
            // SAFETY: forwarded caller contract.
            let initialized = unsafe { $crate::$gen::initialize(param) };
            $crate::entry::finish(initialized, $init)
        }

        /// Versioned extension entry point.
        ///
        /// # Safety
        ///
        /// `envelope` must be null or an envelope whose table is valid for the
        /// rest of the process.
        #[expect(unsafe_code, reason = "exported entry point")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn ExtInitializeVersioned(
            envelope: *const $crate::__private::VersionedTable,
        ) -> i32 {
            // SAFETY: forwarded caller contract.
            let initialized = unsafe { $crate::$gen::initialize_versioned(envelope) };
            $crate::entry::finish(initialized, $init)
        }
    };
}
