//! Error types for the remote client boundary

use thiserror::Error;

use crate::appliance::ApplianceId;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by a remote client or credential provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Credentials could not be obtained or were rejected
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The session is not connected
    #[error("client is not connected")]
    NotConnected,

    /// The appliance is not on the roster
    #[error("unknown appliance: {0}")]
    UnknownAppliance(ApplianceId),

    /// A request for one appliance failed
    #[error("request for {appliance_id} failed: {reason}")]
    RequestFailed {
        appliance_id: ApplianceId,
        reason: String,
    },

    /// The underlying connection failed
    #[error("transport error: {0}")]
    Transport(String),
}
