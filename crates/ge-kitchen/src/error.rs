//! Error types for the integration

use std::path::PathBuf;

use ge_appliance::{ApplianceId, ClientError};
use thiserror::Error;

use crate::state::InvalidTransition;

/// Result type for integration operations
pub type GeKitchenResult<T> = Result<T, GeKitchenError>;

/// Errors raised by the coordinator, facades and setup glue
#[derive(Debug, Error)]
pub enum GeKitchenError {
    /// A facade was requested for an appliance before its first full sync
    #[error("appliance {0} is not ready")]
    NotReady(ApplianceId),

    /// Credentials could not be obtained
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// No facade is registered for this appliance
    #[error("unknown appliance: {0}")]
    UnknownAppliance(ApplianceId),

    /// `start_client` was called on a coordinator that already started
    #[error("coordinator already started")]
    AlreadyStarted,

    /// The readiness signal did not resolve within the setup timeout
    #[error("appliances did not finish initializing within {0:?}")]
    SetupTimeout(std::time::Duration),

    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    #[error("client error: {0}")]
    Client(ClientError),
}

impl From<ClientError> for GeKitchenError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Authentication(reason) => GeKitchenError::Authentication(reason),
            ClientError::UnknownAppliance(id) => GeKitchenError::UnknownAppliance(id),
            other => GeKitchenError::Client(other),
        }
    }
}

impl GeKitchenError {
    /// Whether the host should retry setting up the entry later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeKitchenError::SetupTimeout(_) | GeKitchenError::Client(_)
        )
    }
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading the integration configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
