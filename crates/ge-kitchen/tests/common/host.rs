//! Recording host and coordinator harness

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ge_appliance::memory::{
    ApplianceSeed, InMemoryClient, InMemoryClientFactory, StaticCredentialProvider,
};
use ge_kitchen::{EntityState, GeKitchenConfig, GeKitchenUpdateCoordinator, StateWriter};

use super::test_credentials;

/// Host that records every state written to it
#[derive(Default)]
pub struct RecordingStateWriter {
    states: Mutex<Vec<EntityState>>,
}

impl RecordingStateWriter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<EntityState> {
        self.states.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.states.lock().unwrap().clear();
    }

    /// Most recent state written for an entity
    pub fn latest(&self, unique_id: &str) -> Option<EntityState> {
        self.states
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.unique_id == unique_id)
            .cloned()
    }
}

impl StateWriter for RecordingStateWriter {
    fn write_state(&self, state: EntityState) {
        self.states.lock().unwrap().push(state);
    }
}

/// A coordinator over an in-memory fleet, with handles to every seam
pub struct Harness {
    pub coordinator: GeKitchenUpdateCoordinator,
    pub factory: Arc<InMemoryClientFactory>,
    pub provider: Arc<StaticCredentialProvider>,
    pub host: Arc<RecordingStateWriter>,
}

impl Harness {
    pub fn new(seeds: Vec<ApplianceSeed>) -> Self {
        Self::with_config(GeKitchenConfig::default(), seeds)
    }

    pub fn with_config(config: GeKitchenConfig, seeds: Vec<ApplianceSeed>) -> Self {
        let provider = Arc::new(StaticCredentialProvider::new(test_credentials()));
        Self::with_parts(config, provider, seeds)
    }

    pub fn with_parts(
        config: GeKitchenConfig,
        provider: Arc<StaticCredentialProvider>,
        seeds: Vec<ApplianceSeed>,
    ) -> Self {
        let factory = Arc::new(InMemoryClientFactory::new(seeds));
        let host = RecordingStateWriter::new();
        let coordinator =
            GeKitchenUpdateCoordinator::new(config, provider.clone(), factory.clone(), host.clone());
        Self {
            coordinator,
            factory,
            provider,
            host,
        }
    }

    /// Start the client and wait for its session to come up
    pub async fn start(&self) -> Arc<InMemoryClient> {
        self.coordinator.start_client().await.unwrap();
        let client = self.factory.latest().expect("client created");
        client.wait_connected().await;
        client
    }
}

/// Let spawned tasks drain their queues
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
