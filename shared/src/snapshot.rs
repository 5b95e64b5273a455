//! The client's last-fetched view of available inventory units

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::InventoryUnit;
use crate::types::UnitId;

/// Read-only, order-preserving collection of inventory units
///
/// Snapshot order is the tie-break for every reconciliation decision, so it is
/// kept exactly as the backend returned it.
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    units: Vec<InventoryUnit>,
    index: HashMap<UnitId, usize>,
    fetched_at: DateTime<Utc>,
    duplicates_dropped: usize,
}

impl InventorySnapshot {
    /// Build a snapshot; repeated ids keep their first occurrence
    pub fn new(units: Vec<InventoryUnit>, fetched_at: DateTime<Utc>) -> Self {
        let mut snapshot = Self {
            units: Vec::with_capacity(units.len()),
            index: HashMap::with_capacity(units.len()),
            fetched_at,
            duplicates_dropped: 0,
        };
        snapshot.extend(units);
        snapshot
    }

    fn extend(&mut self, units: Vec<InventoryUnit>) {
        for unit in units {
            if self.index.contains_key(&unit.id) {
                self.duplicates_dropped += 1;
                continue;
            }
            self.index.insert(unit.id.clone(), self.units.len());
            self.units.push(unit);
        }
    }

    /// Add units owned by the receipt being edited; they are not reported as available
    pub fn merge_owned(&mut self, units: Vec<InventoryUnit>) {
        self.extend(units);
    }

    pub fn get(&self, id: &UnitId) -> Option<&InventoryUnit> {
        self.index.get(id).and_then(|&i| self.units.get(i))
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.index.contains_key(id)
    }

    /// Units in snapshot order
    pub fn units(&self) -> &[InventoryUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }
}
