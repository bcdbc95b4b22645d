//! Remote client and credential provider boundaries
//!
//! A client session delivers everything it learns as [`ClientEvent`]s on one
//! channel, in arrival order. The consumer owns the receiving end and
//! dispatches each event to its handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::appliance::{Appliance, ApplianceId};
use crate::erd::ErdCode;
use crate::error::ClientResult;
use crate::value::ErdValue;

/// Events emitted by a client session
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The roster of known appliances was (re)received
    RosterUpdate,
    /// An appliance completed its first full state sync
    InitialUpdate(ApplianceId),
    /// Properties of an appliance changed
    StateChange {
        appliance_id: ApplianceId,
        changed: HashMap<ErdCode, ErdValue>,
    },
}

pub type EventSender = mpsc::UnboundedSender<ClientEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

/// Presence-service credentials for one account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account address on the presence service
    pub address: String,
    pub password: String,
}

impl Credentials {
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of presence-service credentials
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Fetch fresh credentials, failing with an authentication error
    async fn get_credentials(&self) -> ClientResult<Credentials>;
}

/// A persistent session to the appliance cloud
#[async_trait]
pub trait ApplianceClient: Send + Sync {
    /// Connect and process inbound traffic until disconnected
    async fn process(&self) -> ClientResult<()>;

    /// Close the session; `process` returns shortly after
    fn disconnect(&self);

    /// Ask the appliance to report its full state again
    async fn request_update(&self, appliance_id: &ApplianceId) -> ClientResult<()>;

    fn is_connected(&self) -> bool;

    /// Current roster, keyed by appliance id
    fn appliances(&self) -> HashMap<ApplianceId, Arc<Appliance>>;
}

/// Builds client sessions bound to a set of credentials
///
/// Construction performs no I/O; the session connects once `process` runs.
pub trait ClientFactory: Send + Sync {
    fn create(&self, credentials: Credentials, events: EventSender) -> Arc<dyn ApplianceClient>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("user@example.com", "hunter2");
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("user@example.com"));
        assert!(!printed.contains("hunter2"));
    }
}
