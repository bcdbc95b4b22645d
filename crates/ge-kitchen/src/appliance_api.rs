//! Appliance facades
//!
//! A facade wraps one initialized appliance and owns the entities that
//! present it to the host. The facade kind is chosen from the appliance's
//! declared type; every kind starts from the generic entity set.

use std::sync::{Arc, RwLock};

use ge_appliance::{Appliance, ApplianceId, ErdApplianceType, ErdCode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{DeviceInfo, GeEntity, Platform};
use crate::error::{GeKitchenError, GeKitchenResult};
use crate::{DOMAIN, MANUFACTURER};

/// Facade kind for an appliance type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplianceKind {
    Generic,
    Oven,
}

/// Map a declared appliance type to its facade kind
pub fn select_facade_type(appliance_type: ErdApplianceType) -> ApplianceKind {
    match appliance_type {
        ErdApplianceType::Oven => ApplianceKind::Oven,
        ErdApplianceType::Dishwasher
        | ErdApplianceType::Fridge
        | ErdApplianceType::Dryer
        | ErdApplianceType::Washer
        | ErdApplianceType::Microwave
        | ErdApplianceType::WaterHeater
        | ErdApplianceType::Unknown => ApplianceKind::Generic,
    }
}

const UPPER_OVEN_SENSORS: [ErdCode; 10] = [
    ErdCode::UpperOvenCookMode,
    ErdCode::UpperOvenCookTimeRemaining,
    ErdCode::UpperOvenCurrentState,
    ErdCode::UpperOvenDelayTimeRemaining,
    ErdCode::UpperOvenDisplayTemperature,
    ErdCode::UpperOvenElapsedCookTime,
    ErdCode::UpperOvenKitchenTimer,
    ErdCode::UpperOvenProbeDisplayTemp,
    ErdCode::UpperOvenUserTempOffset,
    ErdCode::UpperOvenRawTemperature,
];

const UPPER_OVEN_BINARY_SENSORS: [ErdCode; 2] = [
    ErdCode::UpperOvenProbePresent,
    ErdCode::UpperOvenRemoteEnabled,
];

const LOWER_OVEN_SENSORS: [ErdCode; 10] = [
    ErdCode::LowerOvenCookMode,
    ErdCode::LowerOvenCookTimeRemaining,
    ErdCode::LowerOvenCurrentState,
    ErdCode::LowerOvenDelayTimeRemaining,
    ErdCode::LowerOvenDisplayTemperature,
    ErdCode::LowerOvenElapsedCookTime,
    ErdCode::LowerOvenKitchenTimer,
    ErdCode::LowerOvenProbeDisplayTemp,
    ErdCode::LowerOvenUserTempOffset,
    ErdCode::LowerOvenRawTemperature,
];

const LOWER_OVEN_BINARY_SENSORS: [ErdCode; 2] = [
    ErdCode::LowerOvenProbePresent,
    ErdCode::LowerOvenRemoteEnabled,
];

/// Facade over one initialized appliance
#[derive(Debug)]
pub struct ApplianceApi {
    appliance: Arc<Appliance>,
    kind: ApplianceKind,
    device_info: DeviceInfo,
    /// Entities keyed by unique id, in creation order
    entities: RwLock<IndexMap<String, Arc<GeEntity>>>,
}

impl ApplianceApi {
    /// Build the facade and its entity list
    ///
    /// Fails with `NotReady` if the appliance has not completed its first
    /// full sync.
    pub fn new(appliance: Arc<Appliance>) -> GeKitchenResult<Self> {
        if !appliance.is_initialized() {
            return Err(GeKitchenError::NotReady(appliance.id().clone()));
        }

        let kind = select_facade_type(appliance.appliance_type());
        let device_info = Self::describe(&appliance);
        let api = Self {
            appliance,
            kind,
            device_info,
            entities: RwLock::new(IndexMap::new()),
        };
        api.build_entities_list();
        Ok(api)
    }

    fn describe(appliance: &Appliance) -> DeviceInfo {
        let serial = appliance
            .get(&ErdCode::SerialNumber)
            .map(|v| v.to_string())
            .unwrap_or_else(|| appliance.id().to_string());
        DeviceInfo {
            identifiers: vec![(DOMAIN.to_string(), appliance.id().to_string())],
            name: format!("GE Appliance {}", serial),
            manufacturer: MANUFACTURER.to_string(),
            model: appliance.get(&ErdCode::ModelNumber).map(|v| v.to_string()),
        }
    }

    pub fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }

    pub fn appliance_id(&self) -> &ApplianceId {
        self.appliance.id()
    }

    pub fn kind(&self) -> ApplianceKind {
        self.kind
    }

    pub fn serial_number(&self) -> Option<String> {
        self.appliance
            .get(&ErdCode::SerialNumber)
            .map(|v| v.to_string())
    }

    pub fn model_number(&self) -> Option<String> {
        self.appliance
            .get(&ErdCode::ModelNumber)
            .map(|v| v.to_string())
    }

    pub fn name(&self) -> &str {
        &self.device_info.name
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Whether the oven configuration reports a lower cavity
    fn has_lower_oven(&self) -> bool {
        self.appliance
            .get(&ErdCode::OvenConfiguration)
            .and_then(|v| v.as_oven_configuration())
            .map(|config| config.has_lower_oven)
            .unwrap_or(false)
    }

    /// Every entity this facade should expose, freshly constructed
    pub fn get_all_entities(&self) -> Vec<GeEntity> {
        let sensor = |code: &ErdCode| {
            GeEntity::sensor(self.appliance.clone(), code.clone(), self.device_info.clone())
        };
        let binary = |code: &ErdCode| {
            GeEntity::binary_sensor(self.appliance.clone(), code.clone(), self.device_info.clone())
        };

        let mut entities = vec![sensor(&ErdCode::ClockTime), binary(&ErdCode::SabbathMode)];

        match self.kind {
            ApplianceKind::Generic => {}
            ApplianceKind::Oven => {
                entities.extend(UPPER_OVEN_SENSORS.iter().map(sensor));
                entities.extend(UPPER_OVEN_BINARY_SENSORS.iter().map(binary));
                if self.has_lower_oven() {
                    entities.extend(LOWER_OVEN_SENSORS.iter().map(sensor));
                    entities.extend(LOWER_OVEN_BINARY_SENSORS.iter().map(binary));
                }
            }
        }
        entities
    }

    /// Register entities that are not already present
    ///
    /// Existing entries are never replaced or removed. Returns the number of
    /// entities added.
    pub fn build_entities_list(&self) -> usize {
        let mut added = 0;
        if let Ok(mut entities) = self.entities.write() {
            for entity in self.get_all_entities() {
                let unique_id = entity.unique_id();
                if !entities.contains_key(&unique_id) {
                    entities.insert(unique_id, Arc::new(entity));
                    added += 1;
                }
            }
        }
        if added > 0 {
            debug!(
                appliance_id = %self.appliance.id(),
                kind = ?self.kind,
                added,
                "Built entity list"
            );
        }
        added
    }

    /// Registered entities in creation order
    pub fn entities(&self) -> Vec<Arc<GeEntity>> {
        self.entities
            .read()
            .map(|entities| entities.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn entity(&self, unique_id: &str) -> Option<Arc<GeEntity>> {
        self.entities
            .read()
            .ok()
            .and_then(|entities| entities.get(unique_id).cloned())
    }

    /// Entities the host should create for a platform
    ///
    /// Sensors are offered only for codes the appliance has reported;
    /// binary sensors are always offered.
    pub fn entities_for_platform(&self, platform: Platform) -> Vec<Arc<GeEntity>> {
        self.entities()
            .into_iter()
            .filter(|entity| entity.platform() == platform)
            .filter(|entity| match platform {
                Platform::Sensor => self.appliance.has(entity.erd_code()),
                Platform::BinarySensor => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ge_appliance::{ErdValue, OvenConfiguration};
    use std::collections::{HashMap, HashSet};

    fn oven(has_lower_oven: bool) -> Arc<Appliance> {
        let appliance = Arc::new(Appliance::new(ApplianceId::new("oven1")));
        appliance.update_properties(HashMap::from([
            (
                ErdCode::ApplianceType,
                ErdValue::ApplianceType(ErdApplianceType::Oven),
            ),
            (ErdCode::SerialNumber, ErdValue::from("SN100")),
            (ErdCode::ModelNumber, ErdValue::from("PT9550")),
            (
                ErdCode::OvenConfiguration,
                ErdValue::OvenConfiguration(OvenConfiguration {
                    has_lower_oven,
                    ..Default::default()
                }),
            ),
            (ErdCode::ClockTime, ErdValue::Int(0)),
        ]));
        appliance.mark_initialized();
        appliance
    }

    #[test]
    fn test_select_facade_type() {
        assert_eq!(select_facade_type(ErdApplianceType::Oven), ApplianceKind::Oven);
        assert_eq!(
            select_facade_type(ErdApplianceType::Dishwasher),
            ApplianceKind::Generic
        );
        assert_eq!(
            select_facade_type(ErdApplianceType::Unknown),
            ApplianceKind::Generic
        );
    }

    #[test]
    fn test_uninitialized_appliance_is_not_ready() {
        let appliance = Arc::new(Appliance::new(ApplianceId::new("fridge1")));
        let err = ApplianceApi::new(appliance).unwrap_err();
        assert!(matches!(err, GeKitchenError::NotReady(ref id) if id.as_str() == "fridge1"));
    }

    #[test]
    fn test_generic_entities() {
        let appliance = Arc::new(Appliance::new(ApplianceId::new("fridge1")));
        appliance.mark_initialized();
        let api = ApplianceApi::new(appliance).unwrap();

        assert_eq!(api.kind(), ApplianceKind::Generic);
        let ids: Vec<_> = api.entities().iter().map(|e| e.unique_id()).collect();
        assert_eq!(
            ids,
            vec![
                "ge_kitchen_fridge1_clock_time",
                "ge_kitchen_fridge1_sabbath_mode"
            ]
        );
        assert_eq!(api.name(), "GE Appliance fridge1");
    }

    #[test]
    fn test_lower_oven_doubles_oven_entities() {
        let single = ApplianceApi::new(oven(false)).unwrap();
        let double = ApplianceApi::new(oven(true)).unwrap();

        assert_eq!(single.entities().len(), 2 + 12);
        assert_eq!(double.entities().len(), 2 + 24);

        let ids: HashSet<_> = double.entities().iter().map(|e| e.unique_id()).collect();
        assert_eq!(ids.len(), double.entities().len());
        assert!(ids.contains("ge_kitchen_oven1_lower_oven_cook_mode"));
    }

    #[test]
    fn test_build_entities_list_is_idempotent() {
        let api = ApplianceApi::new(oven(false)).unwrap();
        let before = api.entities();

        assert_eq!(api.build_entities_list(), 0);
        let after = api.entities();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(after.iter()) {
            assert!(Arc::ptr_eq(a, b));
        }
    }

    #[test]
    fn test_build_adds_lower_oven_once_configured() {
        let appliance = oven(false);
        let api = ApplianceApi::new(appliance.clone()).unwrap();
        assert_eq!(api.entities().len(), 14);

        appliance.update_properties(HashMap::from([(
            ErdCode::OvenConfiguration,
            ErdValue::OvenConfiguration(OvenConfiguration {
                has_lower_oven: true,
                ..Default::default()
            }),
        )]));
        assert_eq!(api.build_entities_list(), 12);
        assert_eq!(api.entities().len(), 26);
    }

    #[test]
    fn test_device_info() {
        let api = ApplianceApi::new(oven(false)).unwrap();
        let info = api.device_info();
        assert_eq!(
            info.identifiers,
            vec![("ge_kitchen".to_string(), "oven1".to_string())]
        );
        assert_eq!(info.name, "GE Appliance SN100");
        assert_eq!(info.manufacturer, "GE");
        assert_eq!(info.model.as_deref(), Some("PT9550"));
        assert_eq!(api.serial_number().as_deref(), Some("SN100"));
    }

    #[test]
    fn test_platform_filtering() {
        let api = ApplianceApi::new(oven(false)).unwrap();

        let sensors = api.entities_for_platform(Platform::Sensor);
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].erd_code(), &ErdCode::ClockTime);

        let binaries = api.entities_for_platform(Platform::BinarySensor);
        assert_eq!(binaries.len(), 3);
    }
}
