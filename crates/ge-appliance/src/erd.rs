//! ERD property codes

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! erd_codes {
    ($($variant:ident => $name:literal,)+) => {
        /// Identifier for one piece of appliance state
        ///
        /// Known codes are closed variants; anything the appliance reports that
        /// this crate does not know about is carried verbatim in `Raw`.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum ErdCode {
            $($variant,)+
            Raw(String),
        }

        impl ErdCode {
            /// Every known code, in declaration order
            pub const KNOWN: &'static [ErdCode] = &[$(ErdCode::$variant,)+];

            /// The canonical upper snake case name of the code
            pub fn name(&self) -> &str {
                match self {
                    $(ErdCode::$variant => $name,)+
                    ErdCode::Raw(raw) => raw,
                }
            }

            /// Translate a code name into a known code
            ///
            /// Matching is case-insensitive. Unknown names become `Raw`.
            pub fn translate(code: &str) -> Self {
                let upper = code.trim().to_ascii_uppercase();
                match upper.as_str() {
                    $($name => ErdCode::$variant,)+
                    _ => ErdCode::Raw(code.trim().to_string()),
                }
            }
        }
    };
}

erd_codes! {
    ApplianceType => "APPLIANCE_TYPE",
    ClockTime => "CLOCK_TIME",
    CurrentTemperature => "CURRENT_TEMPERATURE",
    DoorStatus => "DOOR_STATUS",
    ElapsedOnTime => "ELAPSED_ON_TIME",
    HotWaterSetTemp => "HOT_WATER_SET_TEMP",
    LowerOvenCookMode => "LOWER_OVEN_COOK_MODE",
    LowerOvenCookTimeRemaining => "LOWER_OVEN_COOK_TIME_REMAINING",
    LowerOvenCurrentState => "LOWER_OVEN_CURRENT_STATE",
    LowerOvenDelayTimeRemaining => "LOWER_OVEN_DELAY_TIME_REMAINING",
    LowerOvenDisplayTemperature => "LOWER_OVEN_DISPLAY_TEMPERATURE",
    LowerOvenElapsedCookTime => "LOWER_OVEN_ELAPSED_COOK_TIME",
    LowerOvenKitchenTimer => "LOWER_OVEN_KITCHEN_TIMER",
    LowerOvenProbeDisplayTemp => "LOWER_OVEN_PROBE_DISPLAY_TEMP",
    LowerOvenProbePresent => "LOWER_OVEN_PROBE_PRESENT",
    LowerOvenRawTemperature => "LOWER_OVEN_RAW_TEMPERATURE",
    LowerOvenRemoteEnabled => "LOWER_OVEN_REMOTE_ENABLED",
    LowerOvenUserTempOffset => "LOWER_OVEN_USER_TEMP_OFFSET",
    LowerOvenWarmingDrawerState => "LOWER_OVEN_WARMING_DRAWER_STATE",
    ModelNumber => "MODEL_NUMBER",
    OvenConfiguration => "OVEN_CONFIGURATION",
    OvenModeMinMaxTemp => "OVEN_MODE_MIN_MAX_TEMP",
    SabbathMode => "SABBATH_MODE",
    SerialNumber => "SERIAL_NUMBER",
    TemperatureSetting => "TEMPERATURE_SETTING",
    TemperatureUnit => "TEMPERATURE_UNIT",
    TimeRemaining => "TIME_REMAINING",
    TurboCoolStatus => "TURBO_COOL_STATUS",
    TurboFreezeStatus => "TURBO_FREEZE_STATUS",
    UpperOvenCookMode => "UPPER_OVEN_COOK_MODE",
    UpperOvenCookTimeRemaining => "UPPER_OVEN_COOK_TIME_REMAINING",
    UpperOvenCurrentState => "UPPER_OVEN_CURRENT_STATE",
    UpperOvenDelayTimeRemaining => "UPPER_OVEN_DELAY_TIME_REMAINING",
    UpperOvenDisplayTemperature => "UPPER_OVEN_DISPLAY_TEMPERATURE",
    UpperOvenElapsedCookTime => "UPPER_OVEN_ELAPSED_COOK_TIME",
    UpperOvenKitchenTimer => "UPPER_OVEN_KITCHEN_TIMER",
    UpperOvenProbeDisplayTemp => "UPPER_OVEN_PROBE_DISPLAY_TEMP",
    UpperOvenProbePresent => "UPPER_OVEN_PROBE_PRESENT",
    UpperOvenRawTemperature => "UPPER_OVEN_RAW_TEMPERATURE",
    UpperOvenRemoteEnabled => "UPPER_OVEN_REMOTE_ENABLED",
    UpperOvenUserTempOffset => "UPPER_OVEN_USER_TEMP_OFFSET",
    UpperOvenWarmingDrawerState => "UPPER_OVEN_WARMING_DRAWER_STATE",
    WarmingDrawerState => "WARMING_DRAWER_STATE",
}

impl ErdCode {
    /// Whether this is one of the known codes
    pub fn is_known(&self) -> bool {
        !matches!(self, ErdCode::Raw(_))
    }
}

impl From<String> for ErdCode {
    fn from(s: String) -> Self {
        Self::translate(&s)
    }
}

impl From<&str> for ErdCode {
    fn from(s: &str) -> Self {
        Self::translate(s)
    }
}

impl From<ErdCode> for String {
    fn from(code: ErdCode) -> Self {
        code.name().to_string()
    }
}

impl fmt::Display for ErdCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_is_case_insensitive() {
        assert_eq!(ErdCode::translate("clock_time"), ErdCode::ClockTime);
        assert_eq!(
            ErdCode::translate("Upper_Oven_Cook_Mode"),
            ErdCode::UpperOvenCookMode
        );
    }

    #[test]
    fn test_unknown_code_is_raw() {
        let code = ErdCode::translate("0x5a5a");
        assert_eq!(code, ErdCode::Raw("0x5a5a".to_string()));
        assert!(!code.is_known());
        assert_eq!(code.name(), "0x5a5a");
    }

    #[test]
    fn test_names_round_trip_through_translate() {
        for code in ErdCode::KNOWN {
            assert_eq!(&ErdCode::translate(code.name()), code);
        }
    }

    #[test]
    fn test_serde_uses_name() {
        let json = serde_json::to_string(&ErdCode::SabbathMode).unwrap();
        assert_eq!(json, "\"SABBATH_MODE\"");

        let code: ErdCode = serde_json::from_str("\"sabbath_mode\"").unwrap();
        assert_eq!(code, ErdCode::SabbathMode);
    }
}
