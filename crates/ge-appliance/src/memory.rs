//! In-memory appliance cloud
//!
//! A client and factory that keep the whole fleet in process. The session
//! is driven explicitly: callers publish the roster, complete initial syncs
//! and push deltas, and every step is delivered as a [`ClientEvent`] exactly
//! like a networked client would. Used by tests and the simulation server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::appliance::{Appliance, ApplianceId};
use crate::client::{
    ApplianceClient, ClientEvent, ClientFactory, CredentialProvider, Credentials, EventSender,
};
use crate::erd::ErdCode;
use crate::error::{ClientError, ClientResult};
use crate::value::ErdValue;

fn default_available() -> bool {
    true
}

/// Initial description of one simulated appliance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplianceSeed {
    pub id: ApplianceId,

    /// Values reported on the first full sync
    #[serde(default)]
    pub properties: HashMap<ErdCode, ErdValue>,

    #[serde(default = "default_available")]
    pub available: bool,
}

impl ApplianceSeed {
    pub fn new(id: impl Into<ApplianceId>) -> Self {
        Self {
            id: id.into(),
            properties: HashMap::new(),
            available: true,
        }
    }

    pub fn with_property(mut self, code: ErdCode, value: impl Into<ErdValue>) -> Self {
        self.properties.insert(code, value.into());
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }
}

/// Client session over an in-memory fleet
pub struct InMemoryClient {
    credentials: Credentials,
    events: EventSender,
    roster: DashMap<ApplianceId, Arc<Appliance>>,
    seeds: DashMap<ApplianceId, ApplianceSeed>,
    connected: watch::Sender<bool>,
    closed: AtomicBool,
    refresh_requests: DashMap<ApplianceId, u64>,
    refresh_failures: DashMap<ApplianceId, String>,
}

impl InMemoryClient {
    pub fn new(credentials: Credentials, events: EventSender, seeds: Vec<ApplianceSeed>) -> Self {
        let (connected, _) = watch::channel(false);
        let client = Self {
            credentials,
            events,
            roster: DashMap::new(),
            seeds: DashMap::new(),
            connected,
            closed: AtomicBool::new(false),
            refresh_requests: DashMap::new(),
            refresh_failures: DashMap::new(),
        };
        for seed in seeds {
            client.add_appliance(seed);
        }
        client
    }

    /// Credentials the session was created with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Put an appliance on the roster without announcing it
    ///
    /// The appliance starts uninitialized; its seed values are applied when
    /// [`complete_initial_sync`](Self::complete_initial_sync) runs.
    pub fn add_appliance(&self, seed: ApplianceSeed) -> Arc<Appliance> {
        let appliance = Arc::new(Appliance::new(seed.id.clone()));
        appliance.set_available(seed.available);
        self.roster.insert(seed.id.clone(), appliance.clone());
        self.seeds.insert(seed.id.clone(), seed);
        appliance
    }

    /// Deliver a roster update event
    pub fn publish_roster(&self) {
        debug!(appliances = self.roster.len(), "Publishing roster");
        self.emit(ClientEvent::RosterUpdate);
    }

    /// Apply the seed values, mark the appliance initialized and announce it
    ///
    /// Returns false if the appliance is unknown or was already initialized.
    pub fn complete_initial_sync(&self, appliance_id: &ApplianceId) -> bool {
        let Some(appliance) = self.appliance(appliance_id) else {
            return false;
        };
        if let Some(seed) = self.seeds.get(appliance_id) {
            appliance.update_properties(seed.properties.clone());
        }
        if !appliance.mark_initialized() {
            return false;
        }
        self.emit(ClientEvent::InitialUpdate(appliance_id.clone()));
        true
    }

    /// Merge values into an appliance and announce what changed
    ///
    /// Returns the number of properties that changed.
    pub fn apply_delta(
        &self,
        appliance_id: &ApplianceId,
        values: HashMap<ErdCode, ErdValue>,
    ) -> usize {
        let Some(appliance) = self.appliance(appliance_id) else {
            return 0;
        };
        let changed = appliance.update_properties(values);
        let count = changed.len();
        if count > 0 {
            self.emit(ClientEvent::StateChange {
                appliance_id: appliance_id.clone(),
                changed,
            });
        }
        count
    }

    /// Deliver a state change event for an id regardless of the roster
    pub fn emit_state_change(
        &self,
        appliance_id: ApplianceId,
        changed: HashMap<ErdCode, ErdValue>,
    ) {
        self.emit(ClientEvent::StateChange {
            appliance_id,
            changed,
        });
    }

    pub fn set_available(&self, appliance_id: &ApplianceId, available: bool) {
        if let Some(appliance) = self.appliance(appliance_id) {
            appliance.set_available(available);
        }
    }

    /// Make every refresh request for this appliance fail
    pub fn fail_refresh(&self, appliance_id: &ApplianceId, reason: impl Into<String>) {
        self.refresh_failures
            .insert(appliance_id.clone(), reason.into());
    }

    pub fn clear_refresh_failure(&self, appliance_id: &ApplianceId) {
        self.refresh_failures.remove(appliance_id);
    }

    /// Number of refresh requests received for an appliance, failed ones included
    pub fn refresh_count(&self, appliance_id: &ApplianceId) -> u64 {
        self.refresh_requests
            .get(appliance_id)
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Wait until `process` has brought the session up
    pub async fn wait_connected(&self) {
        let mut rx = self.connected.subscribe();
        let _ = rx.wait_for(|connected| *connected).await;
    }

    pub fn appliance(&self, appliance_id: &ApplianceId) -> Option<Arc<Appliance>> {
        self.roster.get(appliance_id).map(|a| a.value().clone())
    }

    fn emit(&self, event: ClientEvent) {
        trace!(?event, "Emitting client event");
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped, discarding event");
        }
    }
}

#[async_trait]
impl ApplianceClient for InMemoryClient {
    async fn process(&self) -> ClientResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::NotConnected);
        }
        let mut rx = self.connected.subscribe();
        self.connected.send_replace(true);
        info!(address = %self.credentials.address, "Session established");

        let _ = rx.wait_for(|connected| !*connected).await;
        info!(address = %self.credentials.address, "Session closed");
        Ok(())
    }

    fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.connected.send_replace(false);
    }

    async fn request_update(&self, appliance_id: &ApplianceId) -> ClientResult<()> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        if !self.roster.contains_key(appliance_id) {
            return Err(ClientError::UnknownAppliance(appliance_id.clone()));
        }
        *self
            .refresh_requests
            .entry(appliance_id.clone())
            .or_insert(0) += 1;

        if let Some(reason) = self.refresh_failures.get(appliance_id) {
            return Err(ClientError::RequestFailed {
                appliance_id: appliance_id.clone(),
                reason: reason.clone(),
            });
        }
        trace!(appliance_id = %appliance_id, "Refresh requested");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    fn appliances(&self) -> HashMap<ApplianceId, Arc<Appliance>> {
        self.roster
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }
}

/// Factory producing [`InMemoryClient`] sessions over a fixed set of seeds
#[derive(Default)]
pub struct InMemoryClientFactory {
    seeds: RwLock<Vec<ApplianceSeed>>,
    clients: Mutex<Vec<Arc<InMemoryClient>>>,
}

impl InMemoryClientFactory {
    pub fn new(seeds: Vec<ApplianceSeed>) -> Self {
        Self {
            seeds: RwLock::new(seeds),
            clients: Mutex::new(Vec::new()),
        }
    }

    /// Add a seed used by sessions created from now on
    pub fn add_seed(&self, seed: ApplianceSeed) {
        if let Ok(mut seeds) = self.seeds.write() {
            seeds.push(seed);
        }
    }

    /// The most recently created session
    pub fn latest(&self) -> Option<Arc<InMemoryClient>> {
        self.clients
            .lock()
            .ok()
            .and_then(|clients| clients.last().cloned())
    }

    pub fn created_count(&self) -> usize {
        self.clients.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl ClientFactory for InMemoryClientFactory {
    fn create(&self, credentials: Credentials, events: EventSender) -> Arc<dyn ApplianceClient> {
        let seeds = self
            .seeds
            .read()
            .map(|s| s.clone())
            .unwrap_or_default();
        let client = Arc::new(InMemoryClient::new(credentials, events, seeds));
        if let Ok(mut clients) = self.clients.lock() {
            clients.push(client.clone());
        }
        client
    }
}

/// Credential provider returning a fixed result
pub struct StaticCredentialProvider {
    result: ClientResult<Credentials>,
    calls: AtomicUsize,
}

impl StaticCredentialProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            result: Ok(credentials),
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose every call fails with an authentication error
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            result: Err(ClientError::Authentication(reason.into())),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times credentials were requested
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn get_credentials(&self) -> ClientResult<Credentials> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
