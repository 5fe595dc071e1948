//! Table provider errors.

use std::path::PathBuf;

use crate::ErrorSeverity;

/// Errors raised by the capability table owner.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The extension directory could not be read.
    #[error("failed to read extension directory {}: {source}", path.display())]
    ExtensionDir {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An extension library could not be mapped.
    #[error("failed to load extension {}: {reason}", path.display())]
    ExtensionLoad {
        /// Library path.
        path: PathBuf,
        /// Loader error message.
        reason: String,
    },

    /// An extension library exports no initialization entry point.
    #[error("extension {} has no initialization entry point", path.display())]
    MissingEntryPoint {
        /// Library path.
        path: PathBuf,
    },

    /// An extension's initialization entry point returned a failure code.
    #[error("extension {name} failed to initialize (code {code})")]
    ExtensionInit {
        /// Extension name (library file stem).
        name: String,
        /// Return code from the entry point.
        code: i32,
    },

    /// A provider was installed while another one was still active.
    #[error("a capability table provider is already installed")]
    AlreadyInstalled,

    /// A managed address pattern could not be parsed.
    #[error("invalid address pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// Pattern text as registered.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No managed address record exists under this name.
    #[error("no address record named {name}")]
    AddressNotFound {
        /// Record name.
        name: String,
    },

    /// A managed address pattern matched nothing.
    #[error("pattern for {name} did not match")]
    PatternNotFound {
        /// Record name.
        name: String,
    },

    /// The provider configuration is unusable.
    #[error("invalid host configuration: {0}")]
    InvalidConfig(String),

    /// A typed lookup found an entry registered with another signature.
    #[error("function {name} is registered as {registered}, requested as {requested}")]
    SignatureMismatch {
        /// Function name.
        name: String,
        /// Signature recorded at registration.
        registered: &'static str,
        /// Signature requested by the caller.
        requested: &'static str,
    },
}

impl HostError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HostError::ExtensionDir { .. } => ErrorSeverity::Warning,
            HostError::ExtensionLoad { .. } => ErrorSeverity::Error,
            HostError::MissingEntryPoint { .. } => ErrorSeverity::Warning,
            HostError::ExtensionInit { .. } => ErrorSeverity::Error,
            HostError::InvalidPattern { .. } => ErrorSeverity::Error,
            HostError::AddressNotFound { .. } => ErrorSeverity::Warning,
            HostError::PatternNotFound { .. } => ErrorSeverity::Warning,
            HostError::InvalidConfig(_) => ErrorSeverity::Error,
            HostError::AlreadyInstalled => ErrorSeverity::Critical,
            HostError::SignatureMismatch { .. } => ErrorSeverity::Critical,
        }
    }
}
