//! Quantity reconciliation for receipt composition
//!
//! Translates "I want N of this group" into concrete unit selections against
//! the inventory snapshot. All operations are synchronous and in-memory.
//! Rejections come back as [`ReconcileError`] and never touch the selection;
//! clamped requests succeed with a [`QuantityUnavailable`] notice.
//!
//! Candidates are always drawn in snapshot order. When a group shrinks, the
//! most recently added units of that group are removed first.

use serde::Serialize;

use crate::errors::{QuantityUnavailable, ReconcileError};
use crate::grouping::{group_key, is_candidate, GroupKey};
use crate::models::InventoryUnit;
use crate::selection::SelectionModel;
use crate::snapshot::InventorySnapshot;
use crate::types::UnitId;

/// What a successful reconciliation changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub key: GroupKey,
    pub added: Vec<UnitId>,
    pub removed: Vec<UnitId>,
    /// Number of selected units in the group afterwards
    pub quantity: usize,
    /// Set when the request was clamped to the available stock
    pub notice: Option<QuantityUnavailable>,
}

impl Reconciliation {
    fn unchanged(key: &GroupKey, quantity: usize) -> Self {
        Self {
            key: key.clone(),
            added: Vec::new(),
            removed: Vec::new(),
            quantity,
            notice: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub type ReconcileResult = Result<Reconciliation, ReconcileError>;

/// Reconciles requested quantities against a snapshot
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    snapshot: &'a InventorySnapshot,
}

impl<'a> Reconciler<'a> {
    pub fn new(snapshot: &'a InventorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Unselected operational units of a fungible group, in snapshot order
    pub fn candidates(&self, key: &GroupKey, selection: &SelectionModel) -> Vec<&'a InventoryUnit> {
        self.snapshot
            .units()
            .iter()
            .filter(|u| is_candidate(u, selection) && &group_key(u) == key)
            .collect()
    }

    /// Append up to `requested` more units of a group
    pub fn add_to_group(
        &self,
        selection: &mut SelectionModel,
        key: &GroupKey,
        requested: usize,
    ) -> ReconcileResult {
        reject_cipher(key)?;

        let current = selection.count_for(key);
        if requested == 0 {
            return Ok(Reconciliation::unchanged(key, current));
        }

        let candidates = self.candidates(key, selection);
        if candidates.is_empty() {
            return Err(ReconcileError::EmptyCandidateSet { key: key.clone() });
        }

        let notice = (requested > candidates.len()).then(|| QuantityUnavailable {
            requested: current + requested,
            available_max: current + candidates.len(),
        });
        let added = push_all(selection, candidates.into_iter().take(requested));

        Ok(Reconciliation {
            key: key.clone(),
            quantity: current + added.len(),
            added,
            removed: Vec::new(),
            notice,
        })
    }

    /// Grow or shrink a group to `new_quantity`, clamped to what is available
    pub fn set_group_quantity(
        &self,
        selection: &mut SelectionModel,
        key: &GroupKey,
        new_quantity: usize,
    ) -> ReconcileResult {
        reject_cipher(key)?;

        if new_quantity == 0 {
            return Ok(self.remove_group(selection, key));
        }

        let current = selection.count_for(key);
        let candidates = self.candidates(key, selection);
        let available_max = current + candidates.len();
        if available_max == 0 {
            return Err(ReconcileError::EmptyCandidateSet { key: key.clone() });
        }

        let target = new_quantity.min(available_max);
        let notice = (new_quantity > available_max).then_some(QuantityUnavailable {
            requested: new_quantity,
            available_max,
        });

        let mut outcome = Reconciliation::unchanged(key, target);
        outcome.notice = notice;

        if target > current {
            outcome.added = push_all(selection, candidates.into_iter().take(target - current));
        } else if target < current {
            outcome.removed = selection
                .remove_latest_of_group(key, current - target)
                .into_iter()
                .map(|e| e.unit.id)
                .collect();
        }

        Ok(outcome)
    }

    /// Remove every selected unit of a group; accepts cipher keys too
    pub fn remove_group(&self, selection: &mut SelectionModel, key: &GroupKey) -> Reconciliation {
        let removed = selection
            .remove_group(key)
            .into_iter()
            .map(|e| e.unit.id)
            .collect();

        Reconciliation {
            key: key.clone(),
            added: Vec::new(),
            removed,
            quantity: 0,
            notice: None,
        }
    }

    /// Add a single cipher unit by identity
    pub fn add_cipher_unit(&self, selection: &mut SelectionModel, unit_id: &UnitId) -> ReconcileResult {
        let unit = self
            .snapshot
            .get(unit_id)
            .ok_or_else(|| ReconcileError::UnknownUnit {
                unit_id: unit_id.clone(),
            })?;

        if !unit.is_cipher() {
            return Err(ReconcileError::NotACipherUnit {
                unit_id: unit_id.clone(),
            });
        }
        if selection.contains(unit_id) {
            return Err(ReconcileError::AlreadySelected {
                unit_id: unit_id.clone(),
            });
        }
        if !unit.is_operational {
            return Err(ReconcileError::UnitNotOperational {
                unit_id: unit_id.clone(),
            });
        }

        let key = group_key(unit);
        let added = push_all(selection, std::iter::once(unit));
        Ok(Reconciliation {
            key,
            added,
            removed: Vec::new(),
            quantity: 1,
            notice: None,
        })
    }

    /// Remove exactly one cipher unit from the selection
    pub fn remove_cipher_unit(&self, selection: &mut SelectionModel, unit_id: &UnitId) -> ReconcileResult {
        let key = selection
            .iter()
            .find(|e| e.id() == unit_id)
            .map(|e| e.key.clone())
            .ok_or_else(|| ReconcileError::NotSelected {
                unit_id: unit_id.clone(),
            })?;

        if !key.is_cipher() {
            return Err(ReconcileError::NotACipherUnit {
                unit_id: unit_id.clone(),
            });
        }

        let removed = selection
            .remove(unit_id)
            .map(|e| vec![e.unit.id])
            .unwrap_or_default();

        Ok(Reconciliation {
            key,
            added: Vec::new(),
            removed,
            quantity: 0,
            notice: None,
        })
    }
}

fn reject_cipher(key: &GroupKey) -> Result<(), ReconcileError> {
    match key {
        GroupKey::Cipher { unit_id } => Err(ReconcileError::CipherUnitNotAdjustable {
            unit_id: unit_id.clone(),
        }),
        GroupKey::Fungible { .. } => Ok(()),
    }
}

fn push_all<'u>(
    selection: &mut SelectionModel,
    units: impl IntoIterator<Item = &'u InventoryUnit>,
) -> Vec<UnitId> {
    units
        .into_iter()
        .filter(|unit| selection.push((*unit).clone()))
        .map(|unit| unit.id.clone())
        .collect()
}
