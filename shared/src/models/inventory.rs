//! Inventory unit models

use serde::{Deserialize, Serialize};

use crate::types::UnitId;

/// A concrete, individually identified physical item as reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUnit {
    #[serde(alias = "_id")]
    pub id: UnitId,
    /// Item type name (e.g. "Helmet")
    pub name: String,
    /// Physical tag or serial number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_location: Option<AllocatedLocation>,
    /// Cipher flag: the unit must be individually accounted for
    #[serde(default)]
    pub requires_reporting: bool,
    #[serde(default = "default_operational")]
    pub is_operational: bool,
}

fn default_operational() -> bool {
    true
}

impl InventoryUnit {
    pub fn is_cipher(&self) -> bool {
        self.requires_reporting
    }

    pub fn location_id(&self) -> Option<&str> {
        self.allocated_location.as_ref().map(|l| l.id.as_str())
    }

    /// Display label for the unit's location, including the nested unit name when present
    pub fn location_label(&self) -> Option<String> {
        self.allocated_location.as_ref().map(AllocatedLocation::label)
    }
}

/// Location an inventory unit is allocated to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AllocatedLocation {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
}

impl AllocatedLocation {
    pub fn label(&self) -> String {
        match &self.unit_name {
            Some(unit) => format!("{} / {}", self.name, unit),
            None => self.name.clone(),
        }
    }
}
