//! Receipt plans: a JSON description of the receipt to compose
//!
//! ```json
//! {
//!   "recipient": "u1",
//!   "groups": [{ "name": "Helmet", "locationId": "base1", "quantity": 2 }],
//!   "cipherUnits": ["c1"]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use shared::{GroupKey, Reconciliation, UnitId, UserId};

use super::session::ReceiptSession;
use crate::error::{ClientError, ClientResult};
use crate::external::{InventorySource, ReceiptSink, UserDirectory};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPlan {
    pub recipient: UserId,
    #[serde(default)]
    pub groups: Vec<PlannedGroup>,
    #[serde(default)]
    pub cipher_units: Vec<UnitId>,
    /// Cipher units to take off a receipt being edited
    #[serde(default)]
    pub remove_cipher_units: Vec<UnitId>,
}

/// Target quantity of one fungible group
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedGroup {
    pub name: String,
    #[serde(default)]
    pub location_id: Option<String>,
    pub quantity: usize,
}

impl PlannedGroup {
    pub fn key(&self) -> GroupKey {
        GroupKey::fungible(self.name.clone(), self.location_id.as_deref())
    }
}

impl ReceiptPlan {
    pub fn load(path: &Path) -> ClientResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> ClientResult<Self> {
        let plan: ReceiptPlan = serde_json::from_str(raw).map_err(|e| ClientError::InvalidPlan(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> ClientResult<()> {
        let mut keys = HashSet::new();
        for group in &self.groups {
            if !keys.insert(group.key()) {
                return Err(ClientError::InvalidPlan(format!(
                    "group {} is listed more than once",
                    group.name
                )));
            }
        }

        let removed: HashSet<&UnitId> = self.remove_cipher_units.iter().collect();
        if let Some(id) = self.cipher_units.iter().find(|id| removed.contains(id)) {
            return Err(ClientError::InvalidPlan(format!(
                "cipher unit {} is both added and removed",
                id
            )));
        }
        Ok(())
    }

    /// Apply the plan to an open session
    ///
    /// Group quantities are absolute targets. Clamped groups are applied at
    /// their maximum and logged; any rejected operation aborts the plan.
    pub fn apply<A>(&self, session: &mut ReceiptSession<'_, A>) -> ClientResult<Vec<Reconciliation>>
    where
        A: InventorySource + UserDirectory + ReceiptSink,
    {
        session.select_recipient(&self.recipient)?;

        let mut outcomes = Vec::new();
        for group in &self.groups {
            let outcome = session.set_group_quantity(&group.key(), group.quantity)?;
            if let Some(notice) = &outcome.notice {
                tracing::warn!(
                    group = %group.name,
                    requested = notice.requested,
                    available = notice.available_max,
                    "Plan asks for more than is available"
                );
            }
            outcomes.push(outcome);
        }

        for id in &self.remove_cipher_units {
            outcomes.push(session.remove_cipher_unit(id)?);
        }

        for id in &self.cipher_units {
            // Already on the receipt being edited
            if session.draft().selection().contains(id) {
                continue;
            }
            outcomes.push(session.add_cipher_unit(id)?);
        }

        Ok(outcomes)
    }
}
