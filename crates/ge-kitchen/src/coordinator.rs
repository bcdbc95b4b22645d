//! Update coordinator
//!
//! Owns the client session for one account. Client events arrive on a
//! single channel and are handled in delivery order by one dispatch task;
//! each initialized appliance gets its own polling task. Every background
//! task is tied to a cancellation token so `shutdown` stops all of them.
//!
//! ```text
//!            ┌────────────────────┐   ClientEvent    ┌───────────────┐
//! provider → │ ApplianceClient    │ ───────────────→ │ dispatch loop │
//!            └────────────────────┘                  └───────┬───────┘
//!                      ↑ request_update                      │
//!               ┌──────┴──────┐        regenerate_facades ←──┤
//!               │ poll tasks  │ ←── spawn on initial update ─┤
//!               └─────────────┘        write_state → host ←──┘
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ge_appliance::{
    Appliance, ApplianceClient, ApplianceId, ClientEvent, ClientFactory, CredentialProvider,
    Credentials, ErdCode, ErdValue, EventReceiver,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::appliance_api::ApplianceApi;
use crate::config::GeKitchenConfig;
use crate::entity::StateWriter;
use crate::error::{GeKitchenError, GeKitchenResult};
use crate::readiness::ReadinessSignal;
use crate::state::CoordinatorState;
use crate::EVENT_ALL_APPLIANCES_READY;

/// Capacity of the coordinator event channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Notifications published by the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    /// Roster received and every appliance on it initialized
    AllAppliancesReady {
        appliance_ids: Vec<ApplianceId>,
        time_fired: DateTime<Utc>,
    },
}

impl CoordinatorEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CoordinatorEvent::AllAppliancesReady { .. } => EVENT_ALL_APPLIANCES_READY,
        }
    }
}

struct CoordinatorInner {
    config: GeKitchenConfig,
    credential_provider: Arc<dyn CredentialProvider>,
    client_factory: Arc<dyn ClientFactory>,
    host: Arc<dyn StateWriter>,

    credentials: RwLock<Option<Credentials>>,
    client: RwLock<Option<Arc<dyn ApplianceClient>>>,
    appliance_apis: DashMap<ApplianceId, Arc<ApplianceApi>>,

    got_roster: AtomicBool,
    initialization: ReadinessSignal,
    state: watch::Sender<CoordinatorState>,
    events: broadcast::Sender<CoordinatorEvent>,

    /// Cancelled on shutdown; parent of every session token
    cancel: CancellationToken,
    /// Cancelled when the current session ends
    session: RwLock<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Coordinates one client session and the facades built from it
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct GeKitchenUpdateCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl GeKitchenUpdateCoordinator {
    pub fn new(
        config: GeKitchenConfig,
        credential_provider: Arc<dyn CredentialProvider>,
        client_factory: Arc<dyn ClientFactory>,
        host: Arc<dyn StateWriter>,
    ) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let session = cancel.child_token();

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                credential_provider,
                client_factory,
                host,
                credentials: RwLock::new(None),
                client: RwLock::new(None),
                appliance_apis: DashMap::new(),
                got_roster: AtomicBool::new(false),
                initialization: ReadinessSignal::new(),
                state,
                events,
                cancel,
                session: RwLock::new(session),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &GeKitchenConfig {
        &self.inner.config
    }

    pub fn state(&self) -> CoordinatorState {
        *self.inner.state.borrow()
    }

    /// Watch lifecycle transitions
    pub fn state_changes(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to coordinator notifications
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.inner.events.subscribe()
    }

    /// Signal resolved once every appliance has initialized
    pub fn initialization(&self) -> ReadinessSignal {
        self.inner.initialization.clone()
    }

    pub fn got_roster(&self) -> bool {
        self.inner.got_roster.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> Option<Arc<dyn ApplianceClient>> {
        self.inner
            .client
            .read()
            .ok()
            .and_then(|client| client.clone())
    }

    /// Appliances on the current roster
    pub fn appliances(&self) -> HashMap<ApplianceId, Arc<Appliance>> {
        self.client()
            .map(|client| client.appliances())
            .unwrap_or_default()
    }

    pub fn appliance_apis(&self) -> HashMap<ApplianceId, Arc<ApplianceApi>> {
        self.inner
            .appliance_apis
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    pub fn appliance_api(&self, appliance_id: &ApplianceId) -> GeKitchenResult<Arc<ApplianceApi>> {
        self.inner
            .appliance_apis
            .get(appliance_id)
            .map(|api| api.value().clone())
            .ok_or_else(|| GeKitchenError::UnknownAppliance(appliance_id.clone()))
    }

    fn session_token(&self) -> CancellationToken {
        self.inner
            .session
            .read()
            .map(|token| token.clone())
            .unwrap_or_else(|_| self.inner.cancel.child_token())
    }

    fn transition(&self, to: CoordinatorState) -> GeKitchenResult<()> {
        let mut result = Ok(());
        self.inner.state.send_if_modified(|state| match state.try_transition(to) {
            Ok(next) => {
                debug!(from = ?*state, to = ?next, "Coordinator state transition");
                *state = next;
                true
            }
            Err(e) => {
                result = Err(e);
                false
            }
        });
        result.map_err(GeKitchenError::from)
    }

    /// Construct a client bound to the credentials, wired back to a fresh
    /// event channel
    pub fn create_client(
        &self,
        credentials: Credentials,
    ) -> (Arc<dyn ApplianceClient>, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.inner.client_factory.create(credentials, tx);
        (client, rx)
    }

    async fn get_credentials(&self) -> GeKitchenResult<Credentials> {
        let cached = self
            .inner
            .credentials
            .read()
            .ok()
            .and_then(|creds| creds.clone());
        if let Some(credentials) = cached {
            return Ok(credentials);
        }

        let credentials = self.inner.credential_provider.get_credentials().await?;
        if let Ok(mut slot) = self.inner.credentials.write() {
            *slot = Some(credentials.clone());
        }
        Ok(credentials)
    }

    /// Bring up the client session
    ///
    /// Fetches credentials, creates the client and spawns its processing
    /// loop together with the event dispatch loop. May be called once per
    /// coordinator; credential failures leave it unstarted. A dropped
    /// session is never restarted here, reconnecting takes a new coordinator.
    #[instrument(skip(self))]
    pub async fn start_client(&self) -> GeKitchenResult<()> {
        if self.state() != CoordinatorState::Unstarted {
            return Err(GeKitchenError::AlreadyStarted);
        }

        let credentials = self.get_credentials().await?;
        self.transition(CoordinatorState::Connecting)
            .map_err(|_| GeKitchenError::AlreadyStarted)?;

        let (client, events) = self.create_client(credentials);
        if let Ok(mut slot) = self.inner.client.write() {
            *slot = Some(client.clone());
        }

        let session = self.inner.cancel.child_token();
        if let Ok(mut slot) = self.inner.session.write() {
            *slot = session.clone();
        }

        let process = tokio::spawn(process_task(client, session));
        let dispatch = tokio::spawn(dispatch_loop(
            self.clone(),
            events,
            self.inner.cancel.clone(),
        ));

        let mut handles = self.inner.task_handles.lock().await;
        handles.push(process);
        handles.push(dispatch);

        info!("Client started");
        Ok(())
    }

    /// Route one client event to its handler
    pub async fn dispatch(&self, event: ClientEvent) {
        if self.state() == CoordinatorState::Connecting {
            if let Err(e) = self.transition(CoordinatorState::Initializing) {
                warn!(error = %e, "Could not enter Initializing");
            }
        }

        match event {
            ClientEvent::RosterUpdate => self.on_roster_update().await,
            ClientEvent::InitialUpdate(appliance_id) => {
                self.on_initial_appliance_update(appliance_id).await
            }
            ClientEvent::StateChange {
                appliance_id,
                changed,
            } => self.on_appliance_state_change(appliance_id, changed).await,
        }
    }

    /// Mark the roster received and re-evaluate readiness
    #[instrument(skip(self))]
    pub async fn on_roster_update(&self) {
        self.inner.got_roster.store(true, Ordering::SeqCst);
        debug!(appliances = self.appliances().len(), "Roster received");
        self.regenerate_facades();
        self.maybe_trigger_all_ready();
    }

    /// Register the appliance, re-evaluate readiness and start polling it
    #[instrument(skip(self))]
    pub async fn on_initial_appliance_update(&self, appliance_id: ApplianceId) {
        info!(appliance_id = %appliance_id, "Appliance initialized");
        self.regenerate_facades();
        self.maybe_trigger_all_ready();

        let Some(client) = self.client() else {
            debug!("No client, not polling");
            return;
        };
        let Some(appliance) = client.appliances().get(&appliance_id).cloned() else {
            debug!(appliance_id = %appliance_id, "Appliance not on roster, not polling");
            return;
        };

        let handle = tokio::spawn(poll_appliance(
            client,
            appliance,
            self.inner.config.update_interval(),
            self.session_token(),
        ));
        self.inner.task_handles.lock().await.push(handle);
    }

    /// Re-render every entity of the appliance's facade
    ///
    /// Changes for appliances without a facade are dropped.
    #[instrument(skip(self, changed), fields(changed = changed.len()))]
    pub async fn on_appliance_state_change(
        &self,
        appliance_id: ApplianceId,
        changed: HashMap<ErdCode, ErdValue>,
    ) {
        let api = match self.appliance_api(&appliance_id) {
            Ok(api) => api,
            Err(e) => {
                trace!(error = %e, "Dropping state change");
                return;
            }
        };

        let host = self.inner.host.as_ref();
        for entity in api.entities() {
            entity.write_state(host);
        }
    }

    /// Build facades for initialized roster appliances that lack one
    ///
    /// Existing facades are never replaced. Returns the number added.
    pub fn regenerate_facades(&self) -> usize {
        let mut added = 0;
        for (appliance_id, appliance) in self.appliances() {
            let Entry::Vacant(slot) = self.inner.appliance_apis.entry(appliance_id.clone()) else {
                continue;
            };
            match ApplianceApi::new(appliance) {
                Ok(api) => {
                    debug!(
                        appliance_id = %appliance_id,
                        kind = ?api.kind(),
                        entities = api.entities().len(),
                        "Registered appliance"
                    );
                    slot.insert(Arc::new(api));
                    added += 1;
                }
                Err(e) => debug!(error = %e, "Skipping appliance"),
            }
        }
        added
    }

    /// Whether the roster was received and every appliance on it initialized
    pub fn all_appliances_initialized(&self) -> bool {
        self.got_roster()
            && self
                .appliances()
                .values()
                .all(|appliance| appliance.is_initialized())
    }

    /// Resolve the readiness signal the first time every appliance is ready
    fn maybe_trigger_all_ready(&self) {
        if self.inner.initialization.is_resolved() || !self.all_appliances_initialized() {
            return;
        }

        self.regenerate_facades();
        if !self.inner.initialization.resolve() {
            return;
        }

        if let Err(e) = self.transition(CoordinatorState::Ready) {
            warn!(error = %e, "Readiness resolved outside Initializing");
        }

        let mut appliance_ids: Vec<_> = self.appliances().into_keys().collect();
        appliance_ids.sort();
        info!(appliances = appliance_ids.len(), "All appliances ready");

        let event = CoordinatorEvent::AllAppliancesReady {
            appliance_ids,
            time_fired: Utc::now(),
        };
        if self.inner.events.send(event).is_err() {
            trace!("No subscribers for readiness event");
        }
    }

    /// Stop every background task and disconnect the client
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let client = self
            .inner
            .client
            .write()
            .ok()
            .and_then(|mut client| client.take());
        if let Some(client) = client {
            client.disconnect();
        }

        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "Background task failed");
            }
        }
        debug!("Coordinator shut down");
    }
}

/// Run the client's connection loop until it ends, then end the session
async fn process_task(client: Arc<dyn ApplianceClient>, session: CancellationToken) {
    tokio::select! {
        biased;
        _ = session.cancelled() => {}
        result = client.process() => match result {
            Ok(()) => info!("Client session ended"),
            Err(e) => warn!(error = %e, "Client session failed"),
        },
    }
    session.cancel();
}

async fn dispatch_loop(
    coordinator: GeKitchenUpdateCoordinator,
    mut events: EventReceiver,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                coordinator.dispatch(event).await;
            }
        }
    }
    debug!("Dispatch loop stopped");
}

/// Periodically request a refresh while the session is up and the
/// appliance reachable
async fn poll_appliance(
    client: Arc<dyn ApplianceClient>,
    appliance: Arc<Appliance>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let appliance_id = appliance.id().clone();
    debug!(appliance_id = %appliance_id, ?interval, "Polling started");

    while client.is_connected() && appliance.is_available() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
        trace!(appliance_id = %appliance_id, "Requesting refresh");
        if let Err(e) = client.request_update(&appliance_id).await {
            warn!(appliance_id = %appliance_id, error = %e, "Refresh request failed");
        }
    }

    debug!(appliance_id = %appliance_id, "Polling stopped");
}
