//! Integration entry setup and unload
//!
//! An [`IntegrationEntry`] owns one coordinator for its whole lifetime. The
//! host keeps the entry and hands it back on unload.

use std::sync::Arc;

use ge_appliance::{ClientFactory, CredentialProvider};
use tracing::{info, instrument, warn};
use ulid::Ulid;

use crate::config::GeKitchenConfig;
use crate::coordinator::GeKitchenUpdateCoordinator;
use crate::entity::{GeEntity, Platform, StateWriter};
use crate::error::{GeKitchenError, GeKitchenResult};

/// One configured account and its running coordinator
pub struct IntegrationEntry {
    entry_id: String,
    coordinator: GeKitchenUpdateCoordinator,
    host: Arc<dyn StateWriter>,
}

impl IntegrationEntry {
    /// Start the coordinator and wait for every appliance to initialize
    ///
    /// The wait is bounded by the configured setup timeout. On timeout the
    /// coordinator is shut down and `SetupTimeout` is returned so the host
    /// can retry later. Once ready, every entity's initial state is written
    /// to the host.
    #[instrument(skip_all)]
    pub async fn setup(
        config: GeKitchenConfig,
        credential_provider: Arc<dyn CredentialProvider>,
        client_factory: Arc<dyn ClientFactory>,
        host: Arc<dyn StateWriter>,
    ) -> GeKitchenResult<Self> {
        let entry_id = Ulid::new().to_string();
        let setup_timeout = config.setup_timeout();
        let coordinator = GeKitchenUpdateCoordinator::new(
            config,
            credential_provider,
            client_factory,
            host.clone(),
        );

        if let Err(e) = coordinator.start_client().await {
            coordinator.shutdown().await;
            return Err(e);
        }

        let initialization = coordinator.initialization();
        if tokio::time::timeout(setup_timeout, initialization.wait())
            .await
            .is_err()
        {
            warn!(entry_id = %entry_id, ?setup_timeout, "Appliances did not initialize in time");
            coordinator.shutdown().await;
            return Err(GeKitchenError::SetupTimeout(setup_timeout));
        }

        let entry = Self {
            entry_id,
            coordinator,
            host,
        };
        for platform in Platform::ALL {
            let entities = entry.entities_for_platform(platform);
            info!(
                entry_id = %entry.entry_id,
                platform = %platform,
                entities = entities.len(),
                "Adding entities"
            );
            for entity in entities {
                entity.write_state(entry.host.as_ref());
            }
        }

        Ok(entry)
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn coordinator(&self) -> &GeKitchenUpdateCoordinator {
        &self.coordinator
    }

    /// Entities of every registered appliance offered to a platform
    pub fn entities_for_platform(&self, platform: Platform) -> Vec<Arc<GeEntity>> {
        let mut apis: Vec<_> = self.coordinator.appliance_apis().into_iter().collect();
        apis.sort_by(|a, b| a.0.cmp(&b.0));
        apis.into_iter()
            .flat_map(|(_, api)| api.entities_for_platform(platform))
            .collect()
    }

    /// Stop polling, stop dispatching and disconnect the client
    #[instrument(skip(self), fields(entry_id = %self.entry_id))]
    pub async fn unload(self) {
        self.coordinator.shutdown().await;
        info!("Entry unloaded");
    }
}
