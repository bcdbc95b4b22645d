//! Remote-owned appliance record

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::erd::ErdCode;
use crate::value::{ErdApplianceType, ErdValue};

/// Stable identifier of one physical appliance
///
/// This is the bare presence address of the device: any resource part after
/// a `/` is stripped, so the same appliance always maps to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ApplianceId(String);

impl ApplianceId {
    /// Create an identifier from a presence address, dropping any resource
    pub fn new(address: impl AsRef<str>) -> Self {
        let address = address.as_ref().trim();
        let bare = address.split('/').next().unwrap_or(address);
        Self(bare.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ApplianceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApplianceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ApplianceId> for String {
    fn from(id: ApplianceId) -> Self {
        id.0
    }
}

impl fmt::Display for ApplianceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One physical device tracked by the remote service
///
/// The property cache and the two flags are written only by the remote
/// client as protocol events arrive. Everything else reads.
#[derive(Debug)]
pub struct Appliance {
    id: ApplianceId,
    properties: RwLock<HashMap<ErdCode, ErdValue>>,
    initialized: AtomicBool,
    available: AtomicBool,
}

impl Appliance {
    /// Create an appliance that has not yet synced any state
    pub fn new(id: ApplianceId) -> Self {
        Self {
            id,
            properties: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(false),
            available: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> &ApplianceId {
        &self.id
    }

    /// True once the device completed its first full state sync
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// True while the session reports the device reachable
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Current value of a property, if the appliance reported one
    pub fn get(&self, code: &ErdCode) -> Option<ErdValue> {
        self.properties
            .read()
            .ok()
            .and_then(|props| props.get(code).cloned())
    }

    /// Whether the property cache holds a value for this code
    pub fn has(&self, code: &ErdCode) -> bool {
        self.properties
            .read()
            .map(|props| props.contains_key(code))
            .unwrap_or(false)
    }

    /// Codes currently present in the property cache
    pub fn codes(&self) -> Vec<ErdCode> {
        self.properties
            .read()
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Declared appliance type, `Unknown` until reported
    pub fn appliance_type(&self) -> ErdApplianceType {
        self.get(&ErdCode::ApplianceType)
            .and_then(|v| v.as_appliance_type())
            .unwrap_or_default()
    }

    /// Merge reported values into the property cache
    ///
    /// Returns only the entries whose value actually changed.
    pub fn update_properties(
        &self,
        values: HashMap<ErdCode, ErdValue>,
    ) -> HashMap<ErdCode, ErdValue> {
        let mut changed = HashMap::new();
        if let Ok(mut props) = self.properties.write() {
            for (code, value) in values {
                if props.get(&code) != Some(&value) {
                    props.insert(code.clone(), value.clone());
                    changed.insert(code, value);
                }
            }
        }
        trace!(appliance_id = %self.id, changed = changed.len(), "Updated properties");
        changed
    }

    /// Record that the first full state sync completed
    ///
    /// Returns true only on the first call.
    pub fn mark_initialized(&self) -> bool {
        !self.initialized.swap(true, Ordering::SeqCst)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}
