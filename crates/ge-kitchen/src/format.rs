//! Display formatting for ERD values
//!
//! Turns raw property values into the strings, booleans, units and icons the
//! host renders.

use ge_appliance::{
    ErdCode, ErdCookMode, ErdDoorStatus, ErdMeasurementUnits, ErdOvenState, ErdValue,
    OvenCookSetting,
};

pub const TEMP_CELSIUS: &str = "°C";
pub const TEMP_FAHRENHEIT: &str = "°F";

pub const STATE_OVEN_DELAY: &str = "Delayed";
pub const STATE_OVEN_PROBE: &str = "Probe";
pub const STATE_OVEN_SABBATH: &str = "Sabbath";
pub const STATE_OVEN_TIMED: &str = "Timed";
pub const STATE_OVEN_UNKNOWN: &str = "Unknown";

/// Temperatures reported as-is, zero included
pub fn is_raw_temperature_code(code: &ErdCode) -> bool {
    matches!(
        code,
        ErdCode::LowerOvenRawTemperature
            | ErdCode::LowerOvenUserTempOffset
            | ErdCode::UpperOvenRawTemperature
            | ErdCode::UpperOvenUserTempOffset
            | ErdCode::CurrentTemperature
            | ErdCode::TemperatureSetting
    )
}

/// Temperatures where zero means "nothing to show"
pub fn is_nonzero_temperature_code(code: &ErdCode) -> bool {
    matches!(
        code,
        ErdCode::HotWaterSetTemp
            | ErdCode::LowerOvenDisplayTemperature
            | ErdCode::LowerOvenProbeDisplayTemp
            | ErdCode::UpperOvenDisplayTemperature
            | ErdCode::UpperOvenProbeDisplayTemp
    )
}

pub fn is_temperature_code(code: &ErdCode) -> bool {
    is_raw_temperature_code(code)
        || is_nonzero_temperature_code(code)
        || matches!(code, ErdCode::OvenModeMinMaxTemp)
}

pub fn is_timer_code(code: &ErdCode) -> bool {
    matches!(
        code,
        ErdCode::LowerOvenElapsedCookTime
            | ErdCode::LowerOvenKitchenTimer
            | ErdCode::LowerOvenDelayTimeRemaining
            | ErdCode::LowerOvenCookTimeRemaining
            | ErdCode::ElapsedOnTime
            | ErdCode::TimeRemaining
            | ErdCode::UpperOvenElapsedCookTime
            | ErdCode::UpperOvenKitchenTimer
            | ErdCode::UpperOvenDelayTimeRemaining
            | ErdCode::UpperOvenCookTimeRemaining
    )
}

pub fn is_door_code(code: &ErdCode) -> bool {
    matches!(code, ErdCode::DoorStatus)
}

/// Codes whose displayed value carries a temperature unit
fn carries_temperature_unit(code: &ErdCode) -> bool {
    is_temperature_code(code)
        || matches!(
            code,
            ErdCode::LowerOvenCookMode | ErdCode::UpperOvenCookMode
        )
}

pub fn oven_display_state_to_str(state: ErdOvenState) -> &'static str {
    match state {
        ErdOvenState::NoMode => "Off",
        ErdOvenState::Bake => "Bake",
        ErdOvenState::ConvBake => "Convection Bake",
        ErdOvenState::ConvMultiBake => "Convection Multi-Bake",
        ErdOvenState::ConvRoast => "Convection Roast",
        ErdOvenState::Broil => "Broil",
        ErdOvenState::Proof => "Proof",
        ErdOvenState::Warm => "Warm",
        ErdOvenState::SelfClean => "Self Clean",
        ErdOvenState::SteamClean => "Steam Clean",
        ErdOvenState::Dehydrate => "Dehydrate",
        ErdOvenState::Delay => "Delay",
        ErdOvenState::Unknown => STATE_OVEN_UNKNOWN,
    }
}

fn cook_mode_modifiers(mode: &ErdCookMode) -> Vec<&'static str> {
    let mut modifiers = Vec::new();
    if mode.timed {
        modifiers.push(STATE_OVEN_TIMED);
    }
    if mode.delayed {
        modifiers.push(STATE_OVEN_DELAY);
    }
    if mode.probe {
        modifiers.push(STATE_OVEN_PROBE);
    }
    if mode.sabbath {
        modifiers.push(STATE_OVEN_SABBATH);
    }
    modifiers
}

/// "Bake (350°F) (Timed, Probe)"
pub fn oven_cook_setting_to_str(setting: &OvenCookSetting, units: Option<&str>) -> String {
    let mut out = oven_display_state_to_str(setting.cook_mode.oven_state).to_string();
    if setting.temperature > 0 {
        out.push_str(&format!(" ({}{})", setting.temperature, units.unwrap_or("")));
    }
    let modifiers = cook_mode_modifiers(&setting.cook_mode);
    if !modifiers.is_empty() {
        out.push_str(&format!(" ({})", modifiers.join(", ")));
    }
    out
}

pub fn door_status_to_str(status: ErdDoorStatus) -> &'static str {
    match status {
        ErdDoorStatus::Open => "Open",
        ErdDoorStatus::Closed => "Closed",
        ErdDoorStatus::Na => "N/A",
    }
}

/// Timers render as hours and minutes: "1:05", with whole days split
/// off in front: "1 day, 2:03"
fn timer_to_str(secs: u64) -> String {
    const DAY: u64 = 24 * 3600;
    let clock = format!("{}:{:02}", (secs % DAY) / 3600, (secs % 3600) / 60);
    match secs / DAY {
        0 => clock,
        1 => format!("1 day, {}", clock),
        days => format!("{} days, {}", days, clock),
    }
}

/// Convert a property value into its display string
///
/// An absent value always yields `None`.
pub fn stringify_erd_value(
    code: &ErdCode,
    value: Option<&ErdValue>,
    units: Option<&str>,
) -> Option<String> {
    let value = value?;

    match value {
        ErdValue::OvenState(state) => return Some(oven_display_state_to_str(*state).to_string()),
        ErdValue::CookSetting(setting) => return Some(oven_cook_setting_to_str(setting, units)),
        ErdValue::DoorStatus(status) => return Some(door_status_to_str(*status).to_string()),
        _ => {}
    }

    if *code == ErdCode::ClockTime {
        return match value {
            ErdValue::ClockTime(time) => Some(time.format("%H:%M:%S").to_string()),
            other => Some(other.to_string()),
        };
    }
    if is_nonzero_temperature_code(code) {
        return Some(if value.is_truthy() {
            value.to_string()
        } else {
            String::new()
        });
    }
    if is_timer_code(code) {
        return Some(match value {
            ErdValue::Duration(secs) if *secs > 0 => timer_to_str(*secs),
            ErdValue::Duration(_) => String::new(),
            other => other.to_string(),
        });
    }
    match value {
        ErdValue::Bool(true) => Some("True".to_string()),
        ErdValue::Bool(false) => Some("False".to_string()),
        other => Some(other.to_string()),
    }
}

/// Convert a property value into a binary state
///
/// A door status of `Na` and an absent value are both unknown.
pub fn boolify_erd_value(value: Option<&ErdValue>) -> Option<bool> {
    match value? {
        ErdValue::DoorStatus(ErdDoorStatus::Na) => None,
        ErdValue::DoorStatus(status) => Some(*status == ErdDoorStatus::Open),
        other => Some(other.is_truthy()),
    }
}

/// Unit symbol for a code under the appliance's measurement system
///
/// Only temperature codes carry a unit. Metric selects Celsius; anything
/// else, an unreported system included, selects Fahrenheit.
pub fn get_erd_units(
    code: &ErdCode,
    measurement_units: Option<ErdMeasurementUnits>,
) -> Option<&'static str> {
    if !carries_temperature_unit(code) {
        return None;
    }
    match measurement_units {
        Some(ErdMeasurementUnits::Metric) => Some(TEMP_CELSIUS),
        _ => Some(TEMP_FAHRENHEIT),
    }
}

/// Pick an icon for a code, using the rendered value where it matters
pub fn get_erd_icon(code: &ErdCode, rendered: Option<&str>) -> Option<&'static str> {
    if !code.is_known() {
        return None;
    }
    if is_timer_code(code) {
        return Some("mdi:timer-outline");
    }
    match code {
        ErdCode::LowerOvenCookMode
        | ErdCode::LowerOvenCurrentState
        | ErdCode::LowerOvenWarmingDrawerState
        | ErdCode::UpperOvenCookMode
        | ErdCode::UpperOvenCurrentState
        | ErdCode::UpperOvenWarmingDrawerState
        | ErdCode::WarmingDrawerState => return Some("mdi:stove"),
        ErdCode::TurboCoolStatus | ErdCode::TurboFreezeStatus => return Some("mdi:snowflake"),
        ErdCode::SabbathMode => return Some("mdi:judaism"),
        _ => {}
    }
    if is_door_code(code) {
        if let Some(rendered) = rendered {
            return Some(if rendered.to_lowercase().contains("open") {
                "mdi:door-open"
            } else {
                "mdi:door-closed"
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_absent_value_is_absent() {
        for code in ErdCode::KNOWN {
            assert_eq!(stringify_erd_value(code, None, Some(TEMP_CELSIUS)), None);
        }
        assert_eq!(boolify_erd_value(None), None);
    }

    #[test]
    fn test_clock_time_format() {
        let time = NaiveTime::from_hms_opt(18, 4, 0).unwrap();
        assert_eq!(
            stringify_erd_value(&ErdCode::ClockTime, Some(&ErdValue::ClockTime(time)), None),
            Some("18:04:00".to_string())
        );
    }

    #[test]
    fn test_timer_format() {
        let code = ErdCode::UpperOvenCookTimeRemaining;
        assert_eq!(
            stringify_erd_value(&code, Some(&ErdValue::Duration(3_900)), None),
            Some("1:05".to_string())
        );
        assert_eq!(
            stringify_erd_value(&code, Some(&ErdValue::Duration(0)), None),
            Some(String::new())
        );
    }

    #[test]
    fn test_timer_format_with_days() {
        let code = ErdCode::LowerOvenKitchenTimer;
        assert_eq!(
            stringify_erd_value(&code, Some(&ErdValue::Duration(26 * 3600 + 180)), None),
            Some("1 day, 2:03".to_string())
        );
        assert_eq!(
            stringify_erd_value(&code, Some(&ErdValue::Duration(2 * 86_400 + 59)), None),
            Some("2 days, 0:00".to_string())
        );
        assert_eq!(
            stringify_erd_value(&code, Some(&ErdValue::Duration(86_399)), None),
            Some("23:59".to_string())
        );
    }

    #[test]
    fn test_temperature_formats() {
        assert_eq!(
            stringify_erd_value(&ErdCode::UpperOvenDisplayTemperature, Some(&ErdValue::Int(0)), None),
            Some(String::new())
        );
        assert_eq!(
            stringify_erd_value(&ErdCode::UpperOvenDisplayTemperature, Some(&ErdValue::Int(350)), None),
            Some("350".to_string())
        );
        assert_eq!(
            stringify_erd_value(&ErdCode::UpperOvenRawTemperature, Some(&ErdValue::Int(0)), None),
            Some("0".to_string())
        );
    }

    #[test]
    fn test_cook_setting_format() {
        let setting = OvenCookSetting {
            cook_mode: ErdCookMode {
                oven_state: ErdOvenState::ConvBake,
                timed: true,
                delayed: false,
                probe: true,
                sabbath: false,
            },
            temperature: 375,
        };
        assert_eq!(
            oven_cook_setting_to_str(&setting, Some(TEMP_FAHRENHEIT)),
            "Convection Bake (375°F) (Timed, Probe)"
        );

        let off = OvenCookSetting {
            cook_mode: ErdCookMode {
                oven_state: ErdOvenState::NoMode,
                timed: false,
                delayed: false,
                probe: false,
                sabbath: false,
            },
            temperature: 0,
        };
        assert_eq!(oven_cook_setting_to_str(&off, Some(TEMP_FAHRENHEIT)), "Off");
    }

    #[test]
    fn test_generic_values_stringified() {
        assert_eq!(
            stringify_erd_value(&ErdCode::ModelNumber, Some(&"PT7800".into()), None),
            Some("PT7800".to_string())
        );
        assert_eq!(
            stringify_erd_value(
                &ErdCode::Raw("0x9999".into()),
                Some(&ErdValue::Int(7)),
                None
            ),
            Some("7".to_string())
        );
    }

    #[test]
    fn test_bool_values_capitalized() {
        assert_eq!(
            stringify_erd_value(&ErdCode::SabbathMode, Some(&ErdValue::Bool(true)), None),
            Some("True".to_string())
        );
        assert_eq!(
            stringify_erd_value(&ErdCode::Raw("0x9999".into()), Some(&ErdValue::Bool(false)), None),
            Some("False".to_string())
        );
    }

    #[test]
    fn test_boolify() {
        assert_eq!(boolify_erd_value(Some(&ErdValue::Bool(true))), Some(true));
        assert_eq!(boolify_erd_value(Some(&ErdValue::Int(0))), Some(false));
        assert_eq!(
            boolify_erd_value(Some(&ErdValue::DoorStatus(ErdDoorStatus::Open))),
            Some(true)
        );
        assert_eq!(
            boolify_erd_value(Some(&ErdValue::DoorStatus(ErdDoorStatus::Closed))),
            Some(false)
        );
        assert_eq!(
            boolify_erd_value(Some(&ErdValue::DoorStatus(ErdDoorStatus::Na))),
            None
        );
    }

    #[test]
    fn test_units_follow_measurement_system() {
        let code = ErdCode::UpperOvenDisplayTemperature;
        assert_eq!(
            get_erd_units(&code, Some(ErdMeasurementUnits::Metric)),
            Some(TEMP_CELSIUS)
        );
        assert_eq!(
            get_erd_units(&code, Some(ErdMeasurementUnits::Imperial)),
            Some(TEMP_FAHRENHEIT)
        );
        assert_eq!(get_erd_units(&code, None), Some(TEMP_FAHRENHEIT));
    }

    #[test]
    fn test_non_temperature_codes_have_no_unit() {
        for units in [
            Some(ErdMeasurementUnits::Metric),
            Some(ErdMeasurementUnits::Imperial),
            None,
        ] {
            assert_eq!(get_erd_units(&ErdCode::ClockTime, units), None);
            assert_eq!(get_erd_units(&ErdCode::UpperOvenKitchenTimer, units), None);
            assert_eq!(get_erd_units(&ErdCode::SabbathMode, units), None);
        }
    }

    #[test]
    fn test_icons() {
        assert_eq!(
            get_erd_icon(&ErdCode::UpperOvenKitchenTimer, None),
            Some("mdi:timer-outline")
        );
        assert_eq!(get_erd_icon(&ErdCode::UpperOvenCookMode, None), Some("mdi:stove"));
        assert_eq!(get_erd_icon(&ErdCode::SabbathMode, None), Some("mdi:judaism"));
        assert_eq!(
            get_erd_icon(&ErdCode::DoorStatus, Some("Open")),
            Some("mdi:door-open")
        );
        assert_eq!(
            get_erd_icon(&ErdCode::DoorStatus, Some("Closed")),
            Some("mdi:door-closed")
        );
        assert_eq!(get_erd_icon(&ErdCode::Raw("0x1".into()), None), None);
        assert_eq!(get_erd_icon(&ErdCode::ClockTime, None), None);
    }
}
