//! Selection model: the flat, ordered list of units chosen for a receipt
//!
//! The flat list is the single source of truth. Grouped rows are a projection
//! recomputed from it on demand and are never mutated directly.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::grouping::{group_key, GroupKey};
use crate::models::InventoryUnit;
use crate::types::UnitId;

/// One concrete unit committed to the receipt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEntry {
    pub unit: InventoryUnit,
    pub key: GroupKey,
}

impl SelectionEntry {
    pub fn new(unit: InventoryUnit) -> Self {
        let key = group_key(&unit);
        Self { unit, key }
    }

    pub fn id(&self) -> &UnitId {
        &self.unit.id
    }
}

/// A grouped row as rendered in the receipt table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRow {
    pub key: GroupKey,
    pub name: String,
    pub location_label: Option<String>,
    pub id_number: Option<String>,
    /// Always 1 for cipher rows
    pub quantity: usize,
    pub unit_ids: Vec<UnitId>,
}

impl SelectionRow {
    pub fn is_cipher(&self) -> bool {
        self.key.is_cipher()
    }
}

/// Ordered, duplicate-free list of selection entries
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    entries: Vec<SelectionEntry>,
    ids: HashSet<UnitId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter()
    }

    /// Identifiers in selection order
    pub fn item_ids(&self) -> Vec<UnitId> {
        self.entries.iter().map(|e| e.unit.id.clone()).collect()
    }

    pub fn count_for(&self, key: &GroupKey) -> usize {
        self.entries.iter().filter(|e| &e.key == key).count()
    }

    pub fn ids_for(&self, key: &GroupKey) -> Vec<UnitId> {
        self.entries
            .iter()
            .filter(|e| &e.key == key)
            .map(|e| e.unit.id.clone())
            .collect()
    }

    /// Grouped projection, rows ordered by each group's first entry
    pub fn rows(&self) -> Vec<SelectionRow> {
        let mut rows: Vec<SelectionRow> = Vec::new();
        let mut positions: HashMap<&GroupKey, usize> = HashMap::new();

        for entry in &self.entries {
            match positions.get(&entry.key) {
                Some(&i) => {
                    rows[i].quantity += 1;
                    rows[i].unit_ids.push(entry.unit.id.clone());
                }
                None => {
                    positions.insert(&entry.key, rows.len());
                    rows.push(SelectionRow {
                        key: entry.key.clone(),
                        name: entry.unit.name.clone(),
                        location_label: entry.unit.location_label(),
                        id_number: if entry.key.is_cipher() {
                            entry.unit.id_number.clone()
                        } else {
                            None
                        },
                        quantity: 1,
                        unit_ids: vec![entry.unit.id.clone()],
                    });
                }
            }
        }

        rows
    }

    /// Append a unit; returns `false` and leaves the list unchanged on a duplicate id
    pub(crate) fn push(&mut self, unit: InventoryUnit) -> bool {
        if !self.ids.insert(unit.id.clone()) {
            return false;
        }
        self.entries.push(SelectionEntry::new(unit));
        true
    }

    pub(crate) fn remove(&mut self, id: &UnitId) -> Option<SelectionEntry> {
        let pos = self.entries.iter().position(|e| &e.unit.id == id)?;
        self.ids.remove(id);
        Some(self.entries.remove(pos))
    }

    pub(crate) fn remove_group(&mut self, key: &GroupKey) -> Vec<SelectionEntry> {
        self.remove_where(|e| &e.key == key)
    }

    /// Remove up to `count` entries of a group, most recently added first
    pub(crate) fn remove_latest_of_group(&mut self, key: &GroupKey, count: usize) -> Vec<SelectionEntry> {
        let mut removed = Vec::with_capacity(count);
        while removed.len() < count {
            let Some(pos) = self.entries.iter().rposition(|e| &e.key == key) else {
                break;
            };
            let entry = self.entries.remove(pos);
            self.ids.remove(&entry.unit.id);
            removed.push(entry);
        }
        removed
    }

    pub(crate) fn remove_where(&mut self, mut predicate: impl FnMut(&SelectionEntry) -> bool) -> Vec<SelectionEntry> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if predicate(&entry) {
                removed.push(entry);
            } else {
                kept.push(entry);
            }
        }
        self.entries = kept;
        for entry in &removed {
            self.ids.remove(&entry.unit.id);
        }
        removed
    }

    /// Re-read each entry's unit through `lookup`, recomputing its group key
    ///
    /// Entries the lookup does not know keep the unit they were added with.
    pub(crate) fn refresh_units<'s>(&mut self, lookup: impl Fn(&UnitId) -> Option<&'s InventoryUnit>) {
        for entry in &mut self.entries {
            if let Some(unit) = lookup(entry.id()) {
                *entry = SelectionEntry::new(unit.clone());
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cipher_unit, plain_unit};

    fn ids(selection: &SelectionModel) -> Vec<String> {
        selection.item_ids().iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_push_rejects_duplicates() {
        let mut selection = SelectionModel::new();
        assert!(selection.push(plain_unit("h1", "Helmet", Some("base1"))));
        assert!(!selection.push(plain_unit("h1", "Helmet", Some("base1"))));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_rows_group_fungible_and_keep_cipher_single() {
        let mut selection = SelectionModel::new();
        selection.push(plain_unit("h1", "Helmet", Some("base1")));
        selection.push(cipher_unit("c1", "Radio", Some("base1")));
        selection.push(plain_unit("h2", "Helmet", Some("base1")));
        selection.push(cipher_unit("c2", "Radio", Some("base1")));

        let rows = selection.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].quantity, 2);
        assert_eq!(rows[0].unit_ids, vec![UnitId::new("h1"), UnitId::new("h2")]);
        assert!(rows[1].is_cipher());
        assert_eq!(rows[1].quantity, 1);
        assert_eq!(rows[2].unit_ids, vec![UnitId::new("c2")]);
    }

    #[test]
    fn test_remove_latest_of_group_takes_from_tail() {
        let key = GroupKey::fungible("Helmet", Some("base1"));
        let mut selection = SelectionModel::new();
        selection.push(plain_unit("h1", "Helmet", Some("base1")));
        selection.push(plain_unit("v1", "Vest", Some("base1")));
        selection.push(plain_unit("h2", "Helmet", Some("base1")));
        selection.push(plain_unit("h3", "Helmet", Some("base1")));

        let removed = selection.remove_latest_of_group(&key, 2);
        let removed: Vec<&str> = removed.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(removed, vec!["h3", "h2"]);
        assert_eq!(ids(&selection), vec!["h1", "v1"]);
        assert!(!selection.contains(&UnitId::new("h3")));
    }

    #[test]
    fn test_refresh_units_regroups_moved_units() {
        let mut selection = SelectionModel::new();
        selection.push(plain_unit("h1", "Helmet", Some("base1")));
        selection.push(plain_unit("h2", "Helmet", Some("base1")));
        let moved = plain_unit("h1", "Helmet", Some("base2"));

        selection.refresh_units(|id| (id == &moved.id).then_some(&moved));

        let rows = selection.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, GroupKey::fungible("Helmet", Some("base2")));
        assert_eq!(selection.count_for(&GroupKey::fungible("Helmet", Some("base1"))), 1);
        assert_eq!(ids(&selection), vec!["h1", "h2"]);
    }

    #[test]
    fn test_remove_group_and_clear() {
        let mut selection = SelectionModel::new();
        selection.push(plain_unit("h1", "Helmet", Some("base1")));
        selection.push(plain_unit("h2", "Helmet", Some("base1")));
        selection.push(cipher_unit("c1", "Radio", None));

        let removed = selection.remove_group(&GroupKey::fungible("Helmet", Some("base1")));
        assert_eq!(removed.len(), 2);
        assert_eq!(ids(&selection), vec!["c1"]);

        selection.clear();
        assert!(selection.is_empty());
        assert!(!selection.contains(&UnitId::new("c1")));
    }
}
