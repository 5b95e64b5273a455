//! Fixtures shared by the unit tests of this crate

use chrono::Utc;

use crate::models::{AllocatedLocation, InventoryUnit};
use crate::snapshot::InventorySnapshot;
use crate::types::UnitId;

pub fn plain_unit(id: &str, name: &str, location: Option<&str>) -> InventoryUnit {
    InventoryUnit {
        id: UnitId::new(id),
        name: name.to_string(),
        id_number: None,
        allocated_location: location.map(|loc| AllocatedLocation {
            id: loc.to_string(),
            name: loc.to_string(),
            unit_name: None,
        }),
        requires_reporting: false,
        is_operational: true,
    }
}

pub fn cipher_unit(id: &str, name: &str, location: Option<&str>) -> InventoryUnit {
    InventoryUnit {
        requires_reporting: true,
        id_number: Some(format!("SN-{}", id)),
        ..plain_unit(id, name, location)
    }
}

pub fn snapshot_of(units: Vec<InventoryUnit>) -> InventorySnapshot {
    InventorySnapshot::new(units, Utc::now())
}

/// Three interchangeable helmets at Base1: h1, h2, h3
pub fn helmets_snapshot() -> InventorySnapshot {
    snapshot_of(vec![
        plain_unit("h1", "Helmet", Some("Base1")),
        plain_unit("h2", "Helmet", Some("Base1")),
        plain_unit("h3", "Helmet", Some("Base1")),
    ])
}
