//! Integration configuration
//!
//! Parses the `ge_kitchen:` section from configuration.yaml. Every key is
//! optional; a missing section yields the defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::DOMAIN;

/// Seconds between state refresh requests for each appliance
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 300;

/// Seconds the setup glue waits for every appliance to initialize
pub const DEFAULT_SETUP_TIMEOUT_SECS: u64 = 20;

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

fn default_setup_timeout() -> u64 {
    DEFAULT_SETUP_TIMEOUT_SECS
}

/// Configuration from the `ge_kitchen:` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeKitchenConfig {
    /// Polling interval in seconds
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// Setup timeout in seconds
    #[serde(default = "default_setup_timeout")]
    pub setup_timeout: u64,
}

impl Default for GeKitchenConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL_SECS,
            setup_timeout: DEFAULT_SETUP_TIMEOUT_SECS,
        }
    }
}

impl GeKitchenConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    pub fn setup_timeout(&self) -> Duration {
        Duration::from_secs(self.setup_timeout)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> ConfigResult<()> {
        if self.update_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "update_interval".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.setup_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                key: "setup_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Extract and validate the integration section of a parsed configuration
    pub fn from_root(root: &Value) -> ConfigResult<Self> {
        let config = match root.get(DOMAIN) {
            None | Some(Value::Null) => Self::default(),
            Some(section) => serde_yaml::from_value(section.clone()).map_err(|e| {
                ConfigError::InvalidValue {
                    key: DOMAIN.to_string(),
                    reason: e.to_string(),
                }
            })?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a configuration.yaml file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading {} configuration from {:?}", DOMAIN, path);

        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_root(&root)
    }
}
