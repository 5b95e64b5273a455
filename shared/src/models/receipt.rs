//! Receipt models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{InventoryUnit, User};
use crate::types::ReceiptId;

/// A signed receipt as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(alias = "_id")]
    pub id: ReceiptId,
    pub recipient: User,
    pub items: Vec<InventoryUnit>,
    #[serde(default)]
    pub status: ReceiptStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Lifecycle status of a receipt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    #[default]
    Active,
    Returned,
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiptStatus::Active => write!(f, "Active"),
            ReceiptStatus::Returned => write!(f, "Returned"),
        }
    }
}
