//! Attachment states.

use std::fmt;

/// Where attachment ended, or currently is.
///
/// `Unattached` and `PathExtended` are intermediate. Every other state is
/// terminal: attachment never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachState {
    /// Nothing has been done yet.
    Unattached,
    /// The process is not the expected host. Nothing was touched.
    HostMismatch,
    /// The core module was already mapped, by another forwarding stub or by
    /// the host itself.
    AlreadyAttached,
    /// The search directory was added to the loader's search order.
    PathExtended,
    /// The core module is mapped and will stay mapped.
    CoreLoaded,
    /// The core module failed to load; the user has been told.
    Failed,
}

impl AttachState {
    /// Whether no further transition can happen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, AttachState::Unattached | AttachState::PathExtended)
    }

    /// Whether the core module ended up mapped by this attachment.
    #[must_use]
    pub const fn is_loaded(self) -> bool {
        matches!(self, AttachState::CoreLoaded)
    }

    /// Whether the state ends attachment without touching the process.
    #[must_use]
    pub const fn is_benign(self) -> bool {
        matches!(self, AttachState::HostMismatch | AttachState::AlreadyAttached)
    }

    /// Short lowercase name, used as a structured log field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AttachState::Unattached => "unattached",
            AttachState::HostMismatch => "host_mismatch",
            AttachState::AlreadyAttached => "already_attached",
            AttachState::PathExtended => "path_extended",
            AttachState::CoreLoaded => "core_loaded",
            AttachState::Failed => "failed",
        }
    }
}

impl fmt::Display for AttachState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
