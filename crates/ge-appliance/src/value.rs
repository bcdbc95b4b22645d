//! Typed ERD property values

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a physical appliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErdApplianceType {
    Oven,
    Dishwasher,
    Fridge,
    Dryer,
    Washer,
    Microwave,
    WaterHeater,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Measurement system the appliance reports its values in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErdMeasurementUnits {
    Imperial,
    Metric,
}

/// Display state of one oven cavity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErdOvenState {
    NoMode,
    Bake,
    ConvBake,
    ConvMultiBake,
    ConvRoast,
    Broil,
    Proof,
    Warm,
    SelfClean,
    SteamClean,
    Dehydrate,
    Delay,
    #[serde(other)]
    Unknown,
}

/// Door state reported by appliances with a door sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErdDoorStatus {
    Open,
    Closed,
    Na,
}

/// Physical layout of an oven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OvenConfiguration {
    #[serde(default)]
    pub has_knob: bool,
    #[serde(default)]
    pub has_warming_drawer: bool,
    #[serde(default)]
    pub has_light_bar: bool,
    #[serde(default)]
    pub has_lower_oven: bool,
    #[serde(default)]
    pub has_lower_oven_kitchen_timer: bool,
}

/// Cook mode of one oven cavity and its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErdCookMode {
    pub oven_state: ErdOvenState,
    #[serde(default)]
    pub timed: bool,
    #[serde(default)]
    pub delayed: bool,
    #[serde(default)]
    pub probe: bool,
    #[serde(default)]
    pub sabbath: bool,
}

/// Cook mode together with its target temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OvenCookSetting {
    pub cook_mode: ErdCookMode,
    #[serde(default)]
    pub temperature: i64,
}

/// The current value of one ERD property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ErdValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    ClockTime(NaiveTime),
    /// Timer length in whole seconds
    Duration(u64),
    MeasurementUnits(ErdMeasurementUnits),
    ApplianceType(ErdApplianceType),
    OvenConfiguration(OvenConfiguration),
    OvenState(ErdOvenState),
    CookSetting(OvenCookSetting),
    DoorStatus(ErdDoorStatus),
}

impl ErdValue {
    /// Truthiness of the raw value
    ///
    /// Numbers are truthy when non-zero, text and timers when non-empty.
    /// Structured values are always truthy, except a door status of `Na`.
    pub fn is_truthy(&self) -> bool {
        match self {
            ErdValue::Bool(b) => *b,
            ErdValue::Int(n) => *n != 0,
            ErdValue::Float(f) => *f != 0.0,
            ErdValue::Text(s) => !s.is_empty(),
            ErdValue::Duration(secs) => *secs != 0,
            ErdValue::DoorStatus(status) => *status != ErdDoorStatus::Na,
            ErdValue::ClockTime(_)
            | ErdValue::MeasurementUnits(_)
            | ErdValue::ApplianceType(_)
            | ErdValue::OvenConfiguration(_)
            | ErdValue::OvenState(_)
            | ErdValue::CookSetting(_) => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ErdValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_measurement_units(&self) -> Option<ErdMeasurementUnits> {
        match self {
            ErdValue::MeasurementUnits(units) => Some(*units),
            _ => None,
        }
    }

    pub fn as_appliance_type(&self) -> Option<ErdApplianceType> {
        match self {
            ErdValue::ApplianceType(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_oven_configuration(&self) -> Option<OvenConfiguration> {
        match self {
            ErdValue::OvenConfiguration(config) => Some(*config),
            _ => None,
        }
    }
}

impl fmt::Display for ErdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErdValue::Bool(b) => write!(f, "{}", b),
            ErdValue::Int(n) => write!(f, "{}", n),
            ErdValue::Float(v) => write!(f, "{}", v),
            ErdValue::Text(s) => f.write_str(s),
            ErdValue::ClockTime(t) => write!(f, "{}", t.format("%H:%M:%S")),
            ErdValue::Duration(secs) => {
                write!(f, "{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
            }
            ErdValue::MeasurementUnits(units) => write!(f, "{:?}", units),
            ErdValue::ApplianceType(t) => write!(f, "{:?}", t),
            ErdValue::OvenConfiguration(config) => write!(f, "{:?}", config),
            ErdValue::OvenState(state) => write!(f, "{:?}", state),
            ErdValue::CookSetting(setting) => {
                write!(f, "{:?} {}", setting.cook_mode.oven_state, setting.temperature)
            }
            ErdValue::DoorStatus(status) => write!(f, "{:?}", status),
        }
    }
}

impl From<bool> for ErdValue {
    fn from(b: bool) -> Self {
        ErdValue::Bool(b)
    }
}

impl From<i64> for ErdValue {
    fn from(n: i64) -> Self {
        ErdValue::Int(n)
    }
}

impl From<&str> for ErdValue {
    fn from(s: &str) -> Self {
        ErdValue::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(ErdValue::Bool(true).is_truthy());
        assert!(!ErdValue::Bool(false).is_truthy());
        assert!(!ErdValue::Int(0).is_truthy());
        assert!(ErdValue::Int(350).is_truthy());
        assert!(!ErdValue::Text(String::new()).is_truthy());
        assert!(!ErdValue::Duration(0).is_truthy());
        assert!(!ErdValue::DoorStatus(ErdDoorStatus::Na).is_truthy());
        assert!(ErdValue::DoorStatus(ErdDoorStatus::Closed).is_truthy());
    }

    #[test]
    fn test_display_duration_and_clock() {
        assert_eq!(ErdValue::Duration(3_725).to_string(), "1:02:05");
        let time = NaiveTime::from_hms_opt(7, 5, 9).unwrap();
        assert_eq!(ErdValue::ClockTime(time).to_string(), "07:05:09");
    }

    #[test]
    fn test_tagged_yaml_fixture() {
        let yaml = r#"
- type: oven_configuration
  value:
    has_lower_oven: true
- type: measurement_units
  value: metric
- type: clock_time
  value: "12:30:00"
- type: appliance_type
  value: toaster
"#;
        let values: Vec<ErdValue> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            values[0].as_oven_configuration().map(|c| c.has_lower_oven),
            Some(true)
        );
        assert_eq!(
            values[1].as_measurement_units(),
            Some(ErdMeasurementUnits::Metric)
        );
        assert!(matches!(values[2], ErdValue::ClockTime(_)));
        assert_eq!(values[3].as_appliance_type(), Some(ErdApplianceType::Unknown));
    }
}
