//! Presentation objects
//!
//! Each entity binds one property code of one appliance to a host-facing
//! object. Entities hold no state of their own: every read goes to the
//! appliance's property cache, so re-rendering after a change only needs a
//! fresh [`EntityState`] snapshot.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ge_appliance::{Appliance, ErdCode, ErdValue};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::format::{boolify_erd_value, get_erd_icon, get_erd_units, stringify_erd_value};
use crate::DOMAIN;

/// Host platform an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Sensor,
    BinarySensor,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Sensor, Platform::BinarySensor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Sensor => "sensor",
            Platform::BinarySensor => "binary_sensor",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device description shared by every entity of one appliance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// `(domain, appliance id)` pairs identifying the device
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Rendered state of one entity at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub unique_id: String,
    pub name: String,
    pub platform: Platform,

    /// Display value; `None` when the appliance has not reported one
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    pub available: bool,
    pub last_updated: DateTime<Utc>,
}

/// Host side of the render path
///
/// The coordinator pushes a snapshot here whenever an entity must be
/// re-rendered.
pub trait StateWriter: Send + Sync {
    fn write_state(&self, state: EntityState);
}

/// Common binding of one property code to one appliance
#[derive(Debug, Clone)]
pub struct ErdEntity {
    appliance: Arc<Appliance>,
    erd_code: ErdCode,
    device_info: DeviceInfo,
}

impl ErdEntity {
    pub fn new(appliance: Arc<Appliance>, erd_code: ErdCode, device_info: DeviceInfo) -> Self {
        Self {
            appliance,
            erd_code,
            device_info,
        }
    }

    pub fn erd_code(&self) -> &ErdCode {
        &self.erd_code
    }

    pub fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }

    /// `ge_kitchen_{appliance id}_{code}` with the code lowercased
    pub fn unique_id(&self) -> String {
        format!(
            "{}_{}_{}",
            DOMAIN,
            self.appliance.id(),
            self.erd_code.name().to_lowercase()
        )
    }

    /// Code name in title case, e.g. "Upper Oven Cook Mode"
    pub fn name(&self) -> String {
        title_case(self.erd_code.name())
    }

    pub fn available(&self) -> bool {
        self.appliance.is_available()
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    fn raw_value(&self) -> Option<ErdValue> {
        self.appliance.get(&self.erd_code)
    }
}

fn title_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entity rendering a property as a display string
#[derive(Debug, Clone)]
pub struct GeSensor {
    base: ErdEntity,
}

impl GeSensor {
    pub fn new(base: ErdEntity) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &ErdEntity {
        &self.base
    }

    pub fn state(&self) -> Option<String> {
        let units = self.unit();
        stringify_erd_value(
            self.base.erd_code(),
            self.base.raw_value().as_ref(),
            units,
        )
    }

    /// Temperature unit under the appliance's measurement system
    pub fn unit(&self) -> Option<&'static str> {
        let measurement_units = self
            .base
            .appliance
            .get(&ErdCode::TemperatureUnit)
            .and_then(|v| v.as_measurement_units());
        get_erd_units(self.base.erd_code(), measurement_units)
    }

    pub fn icon(&self) -> Option<&'static str> {
        get_erd_icon(self.base.erd_code(), self.state().as_deref())
    }
}

/// Entity rendering a property as on/off
#[derive(Debug, Clone)]
pub struct GeBinarySensor {
    base: ErdEntity,
}

impl GeBinarySensor {
    pub fn new(base: ErdEntity) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &ErdEntity {
        &self.base
    }

    /// Truthiness of the raw value; `None` when unknown
    pub fn is_on(&self) -> Option<bool> {
        boolify_erd_value(self.base.raw_value().as_ref())
    }

    pub fn icon(&self) -> Option<&'static str> {
        let rendered = self.is_on().map(|on| if on { "open" } else { "closed" });
        get_erd_icon(self.base.erd_code(), rendered)
    }
}

/// Any entity a facade exposes
#[derive(Debug, Clone)]
pub enum GeEntity {
    Sensor(GeSensor),
    BinarySensor(GeBinarySensor),
}

impl GeEntity {
    pub fn sensor(appliance: Arc<Appliance>, code: ErdCode, device_info: DeviceInfo) -> Self {
        GeEntity::Sensor(GeSensor::new(ErdEntity::new(appliance, code, device_info)))
    }

    pub fn binary_sensor(
        appliance: Arc<Appliance>,
        code: ErdCode,
        device_info: DeviceInfo,
    ) -> Self {
        GeEntity::BinarySensor(GeBinarySensor::new(ErdEntity::new(
            appliance,
            code,
            device_info,
        )))
    }

    pub fn base(&self) -> &ErdEntity {
        match self {
            GeEntity::Sensor(sensor) => sensor.base(),
            GeEntity::BinarySensor(binary) => binary.base(),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            GeEntity::Sensor(_) => Platform::Sensor,
            GeEntity::BinarySensor(_) => Platform::BinarySensor,
        }
    }

    pub fn unique_id(&self) -> String {
        self.base().unique_id()
    }

    pub fn name(&self) -> String {
        self.base().name()
    }

    pub fn erd_code(&self) -> &ErdCode {
        self.base().erd_code()
    }

    pub fn available(&self) -> bool {
        self.base().available()
    }

    pub fn device_info(&self) -> &DeviceInfo {
        self.base().device_info()
    }

    /// Display state: the formatted value for sensors, "on"/"off" for
    /// binary sensors
    pub fn state(&self) -> Option<String> {
        match self {
            GeEntity::Sensor(sensor) => sensor.state(),
            GeEntity::BinarySensor(binary) => binary
                .is_on()
                .map(|on| if on { "on" } else { "off" }.to_string()),
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            GeEntity::Sensor(sensor) => sensor.unit(),
            GeEntity::BinarySensor(_) => None,
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            GeEntity::Sensor(sensor) => sensor.icon(),
            GeEntity::BinarySensor(binary) => binary.icon(),
        }
    }

    pub fn snapshot(&self) -> EntityState {
        EntityState {
            unique_id: self.unique_id(),
            name: self.name(),
            platform: self.platform(),
            state: self.state(),
            unit: self.unit().map(str::to_string),
            icon: self.icon().map(str::to_string),
            available: self.available(),
            last_updated: Utc::now(),
        }
    }

    /// Render the current state into the host
    pub fn write_state(&self, host: &dyn StateWriter) {
        let state = self.snapshot();
        trace!(unique_id = %state.unique_id, state = ?state.state, "Writing entity state");
        host.write_state(state);
    }
}
