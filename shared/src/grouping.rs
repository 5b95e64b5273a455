//! Item grouping key and the derived group views
//!
//! Non-cipher units of the same type at the same location are interchangeable.
//! Cipher units (`requires_reporting`) are never interchangeable with anything,
//! so each one is keyed by its own id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::InventoryUnit;
use crate::selection::SelectionModel;
use crate::snapshot::InventorySnapshot;
use crate::types::UnitId;

/// Equivalence class of an inventory unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GroupKey {
    #[serde(rename_all = "camelCase")]
    Fungible {
        type_name: String,
        /// `None` is a stable "no location" value, not an error
        location_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Cipher { unit_id: UnitId },
}

impl GroupKey {
    pub fn fungible(type_name: impl Into<String>, location_id: Option<&str>) -> Self {
        GroupKey::Fungible {
            type_name: type_name.into(),
            location_id: location_id.map(str::to_string),
        }
    }

    pub fn cipher(unit_id: impl Into<UnitId>) -> Self {
        GroupKey::Cipher {
            unit_id: unit_id.into(),
        }
    }

    pub fn is_cipher(&self) -> bool {
        matches!(self, GroupKey::Cipher { .. })
    }
}

/// Derive the grouping key of a unit
pub fn group_key(unit: &InventoryUnit) -> GroupKey {
    if unit.is_cipher() {
        GroupKey::Cipher {
            unit_id: unit.id.clone(),
        }
    } else {
        GroupKey::Fungible {
            type_name: unit.name.clone(),
            location_id: unit.location_id().map(str::to_string),
        }
    }
}

/// A group of interchangeable units still available for selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemGroup {
    pub key: GroupKey,
    pub name: String,
    pub location_label: Option<String>,
    /// Only set for cipher groups, which always hold exactly one unit
    pub id_number: Option<String>,
    /// Operational units of the class not yet in the selection
    pub available: usize,
}

impl ItemGroup {
    pub fn is_cipher(&self) -> bool {
        self.key.is_cipher()
    }
}

/// Whether a unit can currently be drawn into a selection
pub(crate) fn is_candidate(unit: &InventoryUnit, selection: &SelectionModel) -> bool {
    unit.is_operational && !selection.contains(&unit.id)
}

/// Group the snapshot's unselected, operational units
///
/// Groups appear in order of their first unit in the snapshot. Classes with no
/// remaining unit are omitted.
pub fn available_groups(snapshot: &InventorySnapshot, selection: &SelectionModel) -> Vec<ItemGroup> {
    let mut groups: Vec<ItemGroup> = Vec::new();
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();

    for unit in snapshot.units().iter().filter(|u| is_candidate(u, selection)) {
        let key = group_key(unit);
        match positions.get(&key) {
            Some(&i) => groups[i].available += 1,
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(ItemGroup {
                    id_number: if key.is_cipher() {
                        unit.id_number.clone()
                    } else {
                        None
                    },
                    key,
                    name: unit.name.clone(),
                    location_label: unit.location_label(),
                    available: 1,
                });
            }
        }
    }

    groups
}

/// Filter groups by a free-text query
///
/// Matches type name, location label and id number, ignoring case. A blank
/// query keeps every group.
pub fn search_groups(groups: &[ItemGroup], query: &str) -> Vec<ItemGroup> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return groups.to_vec();
    }

    let matches = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&needle));

    groups
        .iter()
        .filter(|g| {
            matches(Some(&g.name))
                || matches(g.location_label.as_deref())
                || matches(g.id_number.as_deref())
        })
        .cloned()
        .collect()
}
