//! Attachment bootstrap errors.
//!
//! The bootstrap runs inside the host's loader notification, so none of these
//! may ever reach the host. Severity decides what the bootstrap does with them:
//! warnings are logged and attachment continues, errors end attachment with a
//! user-visible diagnostic.

use std::path::PathBuf;

use crate::ErrorSeverity;

/// Errors raised while attaching the core module to a host process.
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    /// The current executable's path could not be read.
    #[error("failed to read host executable path: {0}")]
    ExecutablePath(#[source] std::io::Error),

    /// The loaded module list could not be enumerated.
    #[error("failed to enumerate loaded modules: {0}")]
    ModuleEnumeration(String),

    /// The additional search directory could not be resolved or registered.
    #[error("failed to add library search directory {}: {reason}", path.display())]
    SearchPath {
        /// Directory that was being added.
        path: PathBuf,
        /// Why it failed.
        reason: String,
    },

    /// The core module failed to load.
    #[error("failed to load {module}: {reason}")]
    CoreLoad {
        /// Module file name.
        module: String,
        /// Loader error message.
        reason: String,
    },

    /// The compiled-in bootstrap configuration is unusable.
    #[error("invalid bootstrap configuration: {0}")]
    InvalidConfig(String),
}

impl AttachError {
    /// Create a search path error with context.
    pub fn search_path(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AttachError::SearchPath {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a core load error with context.
    pub fn core_load(module: impl Into<String>, reason: impl ToString) -> Self {
        AttachError::CoreLoad {
            module: module.into(),
            reason: reason.to_string(),
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AttachError::ExecutablePath(_) => ErrorSeverity::Warning,
            AttachError::ModuleEnumeration(_) => ErrorSeverity::Warning,
            AttachError::SearchPath { .. } => ErrorSeverity::Warning,
            AttachError::CoreLoad { .. } => ErrorSeverity::Error,
            AttachError::InvalidConfig(_) => ErrorSeverity::Error,
        }
    }

    /// Check whether attachment should continue after this error.
    pub fn is_soft(&self) -> bool {
        self.severity().is_soft()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_is_soft() {
        let err = AttachError::search_path("lua_framework/bin", "not found");
        assert!(err.is_soft());
        assert!(err.to_string().contains("lua_framework/bin"));
    }

    #[test]
    fn test_core_load_is_not_soft() {
        let err = AttachError::core_load("lua_framework.dll", "module not found");
        assert!(!err.is_soft());
        assert_eq!(
            err.to_string(),
            "failed to load lua_framework.dll: module not found"
        );
    }
}
