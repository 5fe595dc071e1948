//! Compiled-in attachment configuration.

use std::path::{Component, Path, PathBuf};

use luaf_errors::AttachError;
use serde::{Deserialize, Serialize};

/// What to attach, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// File name of the only executable the core attaches to.
    pub host_executable: String,
    /// File name of the core module.
    pub core_module: String,
    /// Directory, relative to the working directory, holding the core module
    /// and its dependencies.
    pub search_dir: PathBuf,
    /// Caption of the load failure dialog.
    pub dialog_title: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            host_executable: "MonsterHunterWorld.exe".to_string(),
            core_module: "lua_framework.dll".to_string(),
            search_dir: PathBuf::from("lua_framework/bin"),
            dialog_title: "LuaFramework".to_string(),
        }
    }
}

impl BootstrapConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// [`AttachError::InvalidConfig`] for empty names, a core module that is
    /// not a bare file name, or an absolute or escaping search directory.
    pub fn validate(&self) -> Result<(), AttachError> {
        if self.host_executable.trim().is_empty() {
            return Err(AttachError::InvalidConfig(
                "host_executable must not be empty".to_string(),
            ));
        }
        if self.core_module.trim().is_empty() {
            return Err(AttachError::InvalidConfig(
                "core_module must not be empty".to_string(),
            ));
        }
        if !is_bare_file_name(&self.core_module) {
            return Err(AttachError::InvalidConfig(format!(
                "core_module must be a bare file name, got {:?}",
                self.core_module
            )));
        }
        if self.search_dir.as_os_str().is_empty() || !is_plain_relative(&self.search_dir) {
            return Err(AttachError::InvalidConfig(format!(
                "search_dir must be a relative path below the working directory, got {}",
                self.search_dir.display()
            )));
        }
        Ok(())
    }

    /// Failure dialog text.
    #[must_use]
    pub fn failure_message(&self) -> String {
        format!("Failed to load {}", self.core_module)
    }
}

fn is_bare_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !name.contains(['/', '\\'])
}

fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Whether the file name of `path` equals `name`, ignoring ASCII case.
#[must_use]
pub fn file_name_matches(path: &Path, name: &str) -> bool {
    path.file_name()
        .and_then(|file| file.to_str())
        .is_some_and(|file| file.eq_ignore_ascii_case(name))
}
