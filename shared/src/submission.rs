//! Submission adapter: wire payloads and conflict interpretation
//!
//! The backend reports units that were claimed by someone else between the
//! snapshot fetch and the submit as a structured list of identifiers in a
//! 409 body. Nothing here resubmits; a conflict is surfaced and the draft
//! waits for an explicit snapshot refresh.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::InventorySnapshot;
use crate::types::{LocalizedMessage, ReceiptId, UnitId, UserId};

/// Body of the create-receipt call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceiptRequest {
    pub recipient_user_id: UserId,
    pub item_ids: Vec<UnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Body of the update-receipt call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReceiptRequest {
    pub recipient_user_id: UserId,
    pub item_ids: Vec<UnitId>,
}

/// A validated, flattened draft ready to hand to the backend
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Submission {
    Create {
        request: CreateReceiptRequest,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        receipt_id: ReceiptId,
        request: UpdateReceiptRequest,
    },
}

impl Submission {
    pub fn item_ids(&self) -> &[UnitId] {
        match self {
            Submission::Create { request } => &request.item_ids,
            Submission::Update { request, .. } => &request.item_ids,
        }
    }
}

/// Error body returned with HTTP 409
#[derive(Debug, Clone, Deserialize)]
pub struct ConflictBody {
    pub error: ConflictDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDetail {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub unavailable_item_ids: Vec<UnitId>,
}

/// Conflict code for units claimed by another receipt
pub const ITEMS_UNAVAILABLE: &str = "ITEMS_UNAVAILABLE";

/// A unit the backend refused, resolved against the snapshot for display
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableItem {
    pub id: UnitId,
    pub name: Option<String>,
    pub id_number: Option<String>,
}

impl UnavailableItem {
    pub fn label(&self) -> String {
        match (&self.name, &self.id_number) {
            (Some(name), Some(number)) => format!("{} ({})", name, number),
            (Some(name), None) => name.clone(),
            _ => self.id.to_string(),
        }
    }
}

/// The backend rejected the submission because units are no longer available
#[derive(Error, Debug, Clone, Serialize, PartialEq, Eq)]
#[error("{} item(s) are no longer available", .unavailable.len())]
#[serde(rename_all = "camelCase")]
pub struct SubmissionConflict {
    pub unavailable: Vec<UnavailableItem>,
    pub server_message: Option<String>,
}

impl SubmissionConflict {
    pub fn code(&self) -> &'static str {
        "SUBMISSION_CONFLICT"
    }

    pub fn unavailable_ids(&self) -> Vec<UnitId> {
        self.unavailable.iter().map(|i| i.id.clone()).collect()
    }

    pub fn message(&self) -> LocalizedMessage {
        if self.unavailable.is_empty() {
            let detail = self.server_message.clone().unwrap_or_default();
            return LocalizedMessage::new(
                format!("Some items are no longer available. {}", detail)
                    .trim_end()
                    .to_string(),
                "חלק מהפריטים כבר אינם זמינים",
            );
        }

        let labels = self
            .unavailable
            .iter()
            .map(UnavailableItem::label)
            .collect::<Vec<_>>()
            .join(", ");
        LocalizedMessage::new(
            format!("These items are no longer available: {}", labels),
            format!("הפריטים הבאים כבר אינם זמינים: {}", labels),
        )
    }
}

/// Resolve a conflict body against the snapshot the draft was built from
pub fn interpret_conflict(body: ConflictBody, snapshot: &InventorySnapshot) -> SubmissionConflict {
    let unavailable = body
        .error
        .unavailable_item_ids
        .into_iter()
        .map(|id| {
            let unit = snapshot.get(&id);
            UnavailableItem {
                name: unit.map(|u| u.name.clone()),
                id_number: unit.and_then(|u| u.id_number.clone()),
                id,
            }
        })
        .collect();

    SubmissionConflict {
        unavailable,
        server_message: body.error.message,
    }
}

/// Parse a raw 409 body; `None` when it is not a conflict body
pub fn parse_conflict(raw: &str, snapshot: &InventorySnapshot) -> Option<SubmissionConflict> {
    let body: ConflictBody = serde_json::from_str(raw).ok()?;
    Some(interpret_conflict(body, snapshot))
}
