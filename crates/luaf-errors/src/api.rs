//! Capability registry errors.
//!
//! Every variant here means the registry was used in a way the producer and
//! consumer builds never agreed on. None of them are retryable.

use crate::{AbiError, ErrorSeverity};

/// Classification of a registry error, matching the exception families the
/// C++ side of the boundary throws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// A caller passed an invalid argument (null table).
    Argument,
    /// The registry was in the wrong state for the operation.
    State,
    /// The table layout did not match this build.
    Abi,
    /// A log message could not be rendered.
    Format,
}

/// Errors raised by the capability registry and the logging façade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// `initialize` was handed a null table pointer.
    #[error("capability table pointer is null")]
    NullTable,

    /// `initialize` was called on a slot that already holds a table.
    #[error("API already initialized")]
    AlreadyInitialized,

    /// The registry was read before `initialize` succeeded.
    #[error("API used before initialization")]
    NotInitialized,

    /// The versioned envelope did not describe this build's table layout.
    #[error("{0}")]
    Abi(#[from] AbiError),

    /// A `Display` implementation reported an error while rendering a log
    /// message.
    #[error("failed to render log message")]
    Format,
}

impl ApiError {
    /// Get the error classification.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::NullTable => ApiErrorKind::Argument,
            ApiError::AlreadyInitialized | ApiError::NotInitialized => ApiErrorKind::State,
            ApiError::Abi(_) => ApiErrorKind::Abi,
            ApiError::Format => ApiErrorKind::Format,
        }
    }

    /// Get the error severity.
    ///
    /// Registry misuse always indicates a build or link-order defect.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }

    /// Check whether this is an argument error.
    pub fn is_argument_error(&self) -> bool {
        self.kind() == ApiErrorKind::Argument
    }

    /// Check whether this is a state error.
    pub fn is_state_error(&self) -> bool {
        self.kind() == ApiErrorKind::State
    }
}

impl From<core::fmt::Error> for ApiError {
    fn from(_: core::fmt::Error) -> Self {
        ApiError::Format
    }
}
