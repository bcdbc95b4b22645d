//! Simulated appliance fleet
//!
//! Loads the fleet description, plays the cloud side of the session, and
//! logs every entity state the integration writes.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use ge_appliance::memory::{ApplianceSeed, InMemoryClientFactory};
use ge_appliance::{ApplianceId, Credentials, ErdCode, ErdValue};
use ge_kitchen::{EntityState, StateWriter};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Interval between simulated clock updates
const CLOCK_TICK: Duration = Duration::from_secs(60);

/// Contents of fleet.yaml
#[derive(Debug, Deserialize)]
pub struct FleetFile {
    pub account: Credentials,
    #[serde(default)]
    pub appliances: Vec<ApplianceSeed>,
}

impl FleetFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fleet file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse fleet file {}", path.display()))
    }

    pub fn appliance_ids(&self) -> Vec<ApplianceId> {
        self.appliances.iter().map(|seed| seed.id.clone()).collect()
    }
}

/// Host that logs every state it receives
pub struct LoggingStateWriter;

impl StateWriter for LoggingStateWriter {
    fn write_state(&self, state: EntityState) {
        info!(
            unique_id = %state.unique_id,
            platform = %state.platform,
            state = state.state.as_deref().unwrap_or("unknown"),
            unit = state.unit.as_deref().unwrap_or(""),
            available = state.available,
            "{}",
            state.name
        );
    }
}

/// Play the cloud side: publish the roster, complete every initial sync,
/// then keep the appliance clocks ticking until cancelled
pub fn spawn_driver(
    factory: Arc<InMemoryClientFactory>,
    appliance_ids: Vec<ApplianceId>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = loop {
            if let Some(client) = factory.latest() {
                break client;
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(Duration::from_millis(50)) => {}
            }
        };
        client.wait_connected().await;

        client.publish_roster();
        for id in &appliance_ids {
            client.complete_initial_sync(id);
        }
        info!(appliances = appliance_ids.len(), "Fleet synced");

        let mut ticker = tokio::time::interval(CLOCK_TICK);
        ticker.tick().await;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let now = ErdValue::ClockTime(Local::now().time());
                    for id in &appliance_ids {
                        let delta = [(ErdCode::ClockTime, now.clone())].into_iter().collect();
                        client.apply_delta(id, delta);
                    }
                    debug!("Clock tick");
                }
            }
        }
    })
}
