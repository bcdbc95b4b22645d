//! Appliance fixtures

use std::path::Path;

use ge_appliance::memory::ApplianceSeed;
use ge_appliance::{
    ApplianceId, Credentials, ErdApplianceType, ErdCode, ErdMeasurementUnits, ErdValue,
    OvenConfiguration,
};

pub const TEST_ADDRESS: &str = "account@presence.test";

pub fn test_credentials() -> Credentials {
    Credentials::new(TEST_ADDRESS, "hunter2")
}

pub fn appliance_id(id: &str) -> ApplianceId {
    ApplianceId::new(id)
}

/// An oven, optionally with a lower cavity
pub fn oven_seed(id: &str, has_lower_oven: bool) -> ApplianceSeed {
    ApplianceSeed::new(id)
        .with_property(
            ErdCode::ApplianceType,
            ErdValue::ApplianceType(ErdApplianceType::Oven),
        )
        .with_property(ErdCode::SerialNumber, format!("SN-{}", id).as_str())
        .with_property(ErdCode::ModelNumber, "JT5500")
        .with_property(
            ErdCode::TemperatureUnit,
            ErdValue::MeasurementUnits(ErdMeasurementUnits::Imperial),
        )
        .with_property(
            ErdCode::OvenConfiguration,
            ErdValue::OvenConfiguration(OvenConfiguration {
                has_lower_oven,
                ..Default::default()
            }),
        )
        .with_property(ErdCode::UpperOvenDisplayTemperature, 350i64)
        .with_property(ErdCode::SabbathMode, false)
}

/// An appliance of a type without a dedicated facade
pub fn generic_seed(id: &str) -> ApplianceSeed {
    ApplianceSeed::new(id)
        .with_property(
            ErdCode::ApplianceType,
            ErdValue::ApplianceType(ErdApplianceType::Dishwasher),
        )
        .with_property(ErdCode::SerialNumber, format!("SN-{}", id).as_str())
        .with_property(ErdCode::SabbathMode, false)
}

/// Load a fixture file as a string
///
/// Fixtures are stored in the `tests/fixtures/` directory.
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);

    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e))
}

/// Load appliance seeds from a YAML fixture
pub fn load_seed_fixture(name: &str) -> Vec<ApplianceSeed> {
    let content = load_fixture(name);
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture '{}' as seeds: {}", name, e))
}
