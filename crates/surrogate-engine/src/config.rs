//! Engine configuration, loaded from the `[proxy]` table of a TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_MODULE_NAME, DEFAULT_PROXY_SUFFIX};

/// Errors raised while loading a [`ProxyConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting has an unusable value
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Proxy synthesis settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Name of the dynamic module synthesized types are defined in
    pub module_name: String,
    /// Suffix appended to the source type's full name (default: `$Proxy`)
    pub proxy_suffix: String,
    /// Skip methods marked with the ignore attribute (default: false, the marker is inert)
    pub honor_ignore_marker: bool,
    /// Validate stack balance of every emitted body (default: true)
    pub validate_bodies: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            proxy_suffix: DEFAULT_PROXY_SUFFIX.to_string(),
            honor_ignore_marker: false,
            validate_bodies: true,
        }
    }
}

/// File layout: settings live under `[proxy]`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    proxy: ProxyConfig,
}

impl ProxyConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from TOML text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.proxy.validate()?;
        Ok(file.proxy)
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.trim().is_empty() {
            return Err(ConfigError::Invalid("module_name cannot be empty".to_string()));
        }
        if self.proxy_suffix.is_empty() {
            return Err(ConfigError::Invalid("proxy_suffix cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Name a proxy type is registered under for a source type's full name
    pub fn derived_name(&self, source_full_name: &str) -> String {
        format!("{}{}", source_full_name, self.proxy_suffix)
    }
}
