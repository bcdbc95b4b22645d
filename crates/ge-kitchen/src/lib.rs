//! GE Kitchen integration
//!
//! This crate bridges a cloud-connected fleet of GE kitchen appliances into
//! a home automation host. It keeps one client session per account, builds
//! a facade for every appliance once its first full sync completes, exposes
//! each facade's properties as sensor and binary sensor entities, and
//! signals when the whole fleet is ready.
//!
//! # Key Types
//!
//! - [`GeKitchenUpdateCoordinator`] - Client session owner and event dispatcher
//! - [`ApplianceApi`] - Facade over one initialized appliance
//! - [`GeEntity`] - Presentation object for one property code
//! - [`ReadinessSignal`] - One-shot "all appliances ready" signal
//! - [`IntegrationEntry`] - Setup and unload glue for one account

pub mod appliance_api;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod format;
pub mod readiness;
pub mod setup;
pub mod state;

/// Integration domain
pub const DOMAIN: &str = "ge_kitchen";

pub const MANUFACTURER: &str = "GE";

/// Event type published once every appliance has initialized
pub const EVENT_ALL_APPLIANCES_READY: &str = "all_appliances_ready";

// Re-export main types
pub use appliance_api::{select_facade_type, ApplianceApi, ApplianceKind};
pub use config::GeKitchenConfig;
pub use coordinator::{CoordinatorEvent, GeKitchenUpdateCoordinator};
pub use entity::{
    DeviceInfo, EntityState, ErdEntity, GeBinarySensor, GeEntity, GeSensor, Platform, StateWriter,
};
pub use error::{ConfigError, ConfigResult, GeKitchenError, GeKitchenResult};
pub use format::{TEMP_CELSIUS, TEMP_FAHRENHEIT};
pub use readiness::ReadinessSignal;
pub use setup::IntegrationEntry;
pub use state::{CoordinatorState, InvalidTransition};
