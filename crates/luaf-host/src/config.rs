//! Provider configuration.

use std::path::PathBuf;

use luaf_errors::HostError;
use serde::{Deserialize, Serialize};

/// Directory scanned for extension libraries, relative to the game directory.
pub const DEFAULT_EXTENSION_DIR: &str = "lua_framework/extensions";

/// Table provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Directory scanned by the extension loader.
    pub extension_dir: PathBuf,
    /// Prefix prepended to records forwarded by [`TracingSink`](crate::TracingSink).
    /// Empty for none.
    pub log_prefix: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            extension_dir: PathBuf::from(DEFAULT_EXTENSION_DIR),
            log_prefix: String::new(),
        }
    }
}

impl HostConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidConfig`] for an empty extension directory or
    /// a prefix containing control characters.
    pub fn validate(&self) -> Result<(), HostError> {
        if self.extension_dir.as_os_str().is_empty() {
            return Err(HostError::InvalidConfig(
                "extension_dir must not be empty".to_string(),
            ));
        }
        if self.log_prefix.chars().any(char::is_control) {
            return Err(HostError::InvalidConfig(
                "log_prefix must not contain control characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> HostConfigBuilder {
        HostConfigBuilder::default()
    }
}

/// Builder for [`HostConfig`].
#[derive(Debug, Default)]
pub struct HostConfigBuilder {
    config: HostConfig,
}

impl HostConfigBuilder {
    /// Set the extension directory.
    #[must_use]
    pub fn extension_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.extension_dir = dir.into();
        self
    }

    /// Set the log prefix.
    #[must_use]
    pub fn log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_prefix = prefix.into();
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<HostConfig, HostError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = HostConfig::default();
        assert!(matches!(config.validate(), Ok(_)));
        assert_eq!(config.extension_dir, PathBuf::from("lua_framework/extensions"));
        assert!(config.log_prefix.is_empty());
    }

    #[test]
    fn test_empty_dir_rejected() {
        let result = HostConfig::builder().extension_dir("").build();
        assert!(matches!(result, Err(HostError::InvalidConfig(_))));
    }

    #[test]
    fn test_control_chars_in_prefix_rejected() {
        let result = HostConfig::builder().log_prefix("core\n").build();
        assert!(matches!(result, Err(HostError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_fields_take_defaults() -> Result<(), serde_json::Error> {
        let config: HostConfig = serde_json::from_str(r#"{ "log_prefix": "core" }"#)?;
        assert_eq!(config.log_prefix, "core");
        assert_eq!(config.extension_dir, PathBuf::from(DEFAULT_EXTENSION_DIR));
        Ok(())
    }
}
