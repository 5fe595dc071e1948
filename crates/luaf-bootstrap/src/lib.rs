//! Attachment bootstrap for the LuaFramework core module.
//!
//! A forwarding stub calls [`on_process_attach`] from its loader
//! notification. The first call in a module runs [`Bootstrap::attach`] over
//! the native [`Platform`]: it checks the host executable, skips attachment if
//! the core module is already mapped, extends the library search order and
//! loads the core module. Failures never reach the host loader; a failed load
//! shows one diagnostic.
//!
//! ```
//! use luaf_bootstrap::{AttachState, BootstrapConfig};
//!
//! let config = BootstrapConfig::default();
//! assert!(config.validate().is_ok());
//! assert!(AttachState::CoreLoaded.is_terminal());
//! ```

pub mod bootstrap;
pub mod config;
pub mod platform;
pub mod state;

#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod win32;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::OnceLock;

pub use bootstrap::Bootstrap;
pub use config::BootstrapConfig;
pub use platform::Platform;
pub use state::AttachState;

/// The platform [`on_process_attach`] runs on.
#[cfg(unix)]
pub type NativePlatform = unix::UnixPlatform;
/// The platform [`on_process_attach`] runs on.
#[cfg(windows)]
pub type NativePlatform = win32::WindowsPlatform;

static ATTACHED: OnceLock<AttachState> = OnceLock::new();

/// Attach the core module with the compiled-in configuration.
///
/// Runs once per module; later calls return the first result. Panics are
/// contained and reported as [`AttachState::Failed`].
pub fn on_process_attach() -> AttachState {
    *ATTACHED.get_or_init(|| {
        catch_unwind(AssertUnwindSafe(|| {
            match Bootstrap::new(BootstrapConfig::default(), NativePlatform::default()) {
                Ok(bootstrap) => bootstrap.attach(),
                Err(e) => {
                    bootstrap::report(&e, "bootstrap configuration rejected");
                    AttachState::Failed
                }
            }
        }))
        .unwrap_or(AttachState::Failed)
    })
}

/// Result of [`on_process_attach`], if it has run in this module.
pub fn attach_state() -> Option<AttachState> {
    ATTACHED.get().copied()
}
