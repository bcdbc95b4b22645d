//! GE Kitchen server
//!
//! Runs the integration against a simulated appliance fleet described in
//! the configuration directory.

mod fleet;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use ge_appliance::memory::{InMemoryClientFactory, StaticCredentialProvider};
use ge_kitchen::{GeKitchenConfig, IntegrationEntry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::fleet::{spawn_driver, FleetFile, LoggingStateWriter};

const CONFIG_FILE: &str = "configuration.yaml";
const FLEET_FILE: &str = "fleet.yaml";

/// Configuration directory from the first argument, defaulting to `config`
fn config_dir() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config"))
}

/// Load the integration section, falling back to defaults when the
/// configuration file does not exist
fn load_config(dir: &Path) -> Result<GeKitchenConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        info!("No {} in {}, using defaults", CONFIG_FILE, dir.display());
        return Ok(GeKitchenConfig::default());
    }
    Ok(GeKitchenConfig::load(&path)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting GE Kitchen");

    let dir = config_dir();
    let config = load_config(&dir)?;
    let fleet = FleetFile::load(dir.join(FLEET_FILE))?;
    info!(
        appliances = fleet.appliances.len(),
        update_interval = config.update_interval,
        setup_timeout = config.setup_timeout,
        "Configuration loaded"
    );

    let appliance_ids = fleet.appliance_ids();
    let factory = Arc::new(InMemoryClientFactory::new(fleet.appliances));
    let provider = Arc::new(StaticCredentialProvider::new(fleet.account));
    let cancel = CancellationToken::new();
    let driver = spawn_driver(factory.clone(), appliance_ids, cancel.clone());

    let entry = match IntegrationEntry::setup(
        config,
        provider,
        factory,
        Arc::new(LoggingStateWriter),
    )
    .await
    {
        Ok(entry) => entry,
        Err(e) => {
            error!(retryable = e.is_retryable(), "Setup failed: {}", e);
            cancel.cancel();
            let _ = driver.await;
            return Err(e.into());
        }
    };

    info!(entry_id = %entry.entry_id(), "GE Kitchen is running");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    cancel.cancel();
    entry.unload().await;
    let _ = driver.await;

    Ok(())
}
