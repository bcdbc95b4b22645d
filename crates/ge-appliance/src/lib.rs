//! Core types for GE kitchen appliances
//!
//! This crate provides the data model shared by the integration and the
//! remote client: property codes (ERD codes), typed property values, the
//! remote-owned appliance record, and the boundary traits through which the
//! integration talks to the appliance cloud.
//!
//! # Key Types
//!
//! - [`ErdCode`] - Identifier for one piece of appliance state
//! - [`ErdValue`] - Typed value of a property
//! - [`Appliance`] - Remote-owned record of one physical device
//! - [`ApplianceClient`] - Persistent session to the appliance cloud
//! - [`ClientEvent`] - Typed events emitted by a client session

mod appliance;
mod client;
mod erd;
mod error;
pub mod memory;
mod value;

pub use appliance::{Appliance, ApplianceId};
pub use client::{
    ApplianceClient, ClientEvent, ClientFactory, CredentialProvider, Credentials, EventReceiver,
    EventSender,
};
pub use erd::ErdCode;
pub use error::{ClientError, ClientResult};
pub use value::{
    ErdApplianceType, ErdCookMode, ErdDoorStatus, ErdMeasurementUnits, ErdOvenState, ErdValue,
    OvenConfiguration, OvenCookSetting,
};
