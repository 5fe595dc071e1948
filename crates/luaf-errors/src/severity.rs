//! How loudly a failure is reported.

use core::fmt;

/// Severity attached to every bridge error.
///
/// Callers pick their log level from it: `Info` and `Warning` failures are
/// reported and skipped, `Error` and `Critical` ones stop the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// A deliberate no-op.
    Info,
    /// Degraded but continuing.
    Warning,
    /// The feature is unavailable.
    Error,
    /// A build or load-order defect.
    Critical,
}

impl ErrorSeverity {
    /// Short uppercase label, matching `tracing` level names where one exists.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARN",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }

    /// Whether the failing operation can be skipped without giving up.
    #[must_use]
    pub const fn is_soft(self) -> bool {
        matches!(self, ErrorSeverity::Info | ErrorSeverity::Warning)
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
