//! The attachment state machine.

use std::path::PathBuf;

use luaf_errors::{AttachError, ErrorSeverity};
use tracing::{debug, error, info, warn};

use crate::config::{BootstrapConfig, file_name_matches};
use crate::platform::Platform;
use crate::state::AttachState;

/// Attaches the core module to the current process through a [`Platform`].
#[derive(Debug)]
pub struct Bootstrap<P> {
    config: BootstrapConfig,
    platform: P,
}

impl<P: Platform> Bootstrap<P> {
    /// Create a bootstrap for `config` over `platform`.
    ///
    /// # Errors
    ///
    /// [`AttachError::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: BootstrapConfig, platform: P) -> Result<Self, AttachError> {
        config.validate()?;
        Ok(Self { config, platform })
    }

    /// The configuration in use.
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// The platform in use.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Run attachment to a terminal state.
    ///
    /// Never fails: every error either ends in a benign state, is logged and
    /// skipped, or ends in [`AttachState::Failed`] after one diagnostic.
    pub fn attach(&self) -> AttachState {
        let exe = match self.platform.current_exe() {
            Ok(exe) => exe,
            Err(e) => {
                report(&e, "cannot identify host executable, not attaching");
                return AttachState::HostMismatch;
            }
        };
        if !file_name_matches(&exe, &self.config.host_executable) {
            debug!(
                exe = %exe.display(),
                expected = %self.config.host_executable,
                "host executable mismatch"
            );
            return AttachState::HostMismatch;
        }

        if self.core_is_mapped() {
            info!(module = %self.config.core_module, "core module already mapped");
            return AttachState::AlreadyAttached;
        }

        let mut state = AttachState::Unattached;
        match self.extend_search_path() {
            Ok(dir) => {
                debug!(dir = %dir.display(), "library search directory added");
                state = AttachState::PathExtended;
            }
            Err(e) => report(&e, "continuing with the default search order"),
        }

        match self.platform.load_module(&self.config.core_module) {
            Ok(()) => {
                info!(module = %self.config.core_module, from = %state, "core module loaded");
                AttachState::CoreLoaded
            }
            Err(e) => {
                report(&e, "core module failed to load");
                self.platform
                    .show_error(&self.config.dialog_title, &self.config.failure_message());
                AttachState::Failed
            }
        }
    }

    fn core_is_mapped(&self) -> bool {
        match self.platform.loaded_modules() {
            Ok(modules) => modules
                .iter()
                .any(|module| file_name_matches(module, &self.config.core_module)),
            Err(e) => {
                report(&e, "cannot enumerate loaded modules");
                false
            }
        }
    }

    fn extend_search_path(&self) -> Result<PathBuf, AttachError> {
        let dir = self.platform.resolve_dir(&self.config.search_dir)?;
        self.platform.add_search_dir(&dir)?;
        Ok(dir)
    }
}

/// Log `err` at the level its severity calls for.
pub(crate) fn report(err: &AttachError, message: &str) {
    let severity = err.severity();
    match severity {
        ErrorSeverity::Info => info!(error = %err, %severity, "{message}"),
        ErrorSeverity::Warning => warn!(error = %err, %severity, "{message}"),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(error = %err, %severity, "{message}");
        }
    }
}
