//! Rejections and notices produced while composing a receipt
//!
//! Every variant carries a stable code and a message in both interface
//! languages so the form can show it next to the affected control.

use serde::Serialize;
use thiserror::Error;

use crate::grouping::GroupKey;
use crate::types::{LocalizedMessage, UnitId, UserId};

/// A reconciler operation that was refused; the selection is left unchanged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("No items available to add for {key:?}")]
    EmptyCandidateSet { key: GroupKey },

    #[error("Item {unit_id} is already selected")]
    AlreadySelected { unit_id: UnitId },

    #[error("Item {unit_id} is not in the current inventory snapshot")]
    UnknownUnit { unit_id: UnitId },

    #[error("Item {unit_id} is not operational")]
    UnitNotOperational { unit_id: UnitId },

    #[error("Item {unit_id} does not require individual reporting")]
    NotACipherUnit { unit_id: UnitId },

    #[error("Quantity of cipher item {unit_id} is fixed at 1")]
    CipherUnitNotAdjustable { unit_id: UnitId },

    #[error("Item {unit_id} is not part of the selection")]
    NotSelected { unit_id: UnitId },
}

impl ReconcileError {
    pub fn code(&self) -> &'static str {
        match self {
            ReconcileError::EmptyCandidateSet { .. } => "EMPTY_CANDIDATE_SET",
            ReconcileError::AlreadySelected { .. } => "ALREADY_SELECTED",
            ReconcileError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            ReconcileError::UnitNotOperational { .. } => "UNIT_NOT_OPERATIONAL",
            ReconcileError::NotACipherUnit { .. } => "NOT_A_CIPHER_UNIT",
            ReconcileError::CipherUnitNotAdjustable { .. } => "CIPHER_UNIT_NOT_ADJUSTABLE",
            ReconcileError::NotSelected { .. } => "NOT_SELECTED",
        }
    }

    pub fn message(&self) -> LocalizedMessage {
        match self {
            ReconcileError::EmptyCandidateSet { .. } => LocalizedMessage::new(
                "No items available to add",
                "אין פריטים זמינים להוספה",
            ),
            ReconcileError::AlreadySelected { unit_id } => LocalizedMessage::new(
                format!("Item {} is already selected", unit_id),
                format!("הפריט {} כבר נבחר", unit_id),
            ),
            ReconcileError::UnknownUnit { unit_id } => LocalizedMessage::new(
                format!("Item {} is not available", unit_id),
                format!("הפריט {} אינו זמין", unit_id),
            ),
            ReconcileError::UnitNotOperational { unit_id } => LocalizedMessage::new(
                format!("Item {} is not operational", unit_id),
                format!("הפריט {} אינו כשיר", unit_id),
            ),
            ReconcileError::NotACipherUnit { unit_id } => LocalizedMessage::new(
                format!("Item {} is not a cipher item", unit_id),
                format!("הפריט {} אינו פריט צופן", unit_id),
            ),
            ReconcileError::CipherUnitNotAdjustable { .. } => LocalizedMessage::new(
                "The quantity of a cipher item is always 1",
                "הכמות של פריט צופן היא תמיד 1",
            ),
            ReconcileError::NotSelected { unit_id } => LocalizedMessage::new(
                format!("Item {} is not in the receipt", unit_id),
                format!("הפריט {} אינו בקבלה", unit_id),
            ),
        }
    }
}

/// Requested quantity was clamped to what the snapshot can supply
///
/// Both counts are group totals: for an add request `requested` is the
/// quantity the group would have reached, not the number of units asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityUnavailable {
    pub requested: usize,
    pub available_max: usize,
}

impl QuantityUnavailable {
    pub fn code(&self) -> &'static str {
        "QUANTITY_UNAVAILABLE"
    }

    pub fn message(&self) -> LocalizedMessage {
        LocalizedMessage::new(
            format!(
                "Requested {} but only {} available",
                self.requested, self.available_max
            ),
            format!(
                "התבקשו {} אך זמינים רק {}",
                self.requested, self.available_max
            ),
        )
    }
}

/// The draft cannot be turned into a submission (or a draft-level action was refused)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("A recipient must be selected")]
    MissingRecipient,

    #[error("Unknown recipient: {0}")]
    UnknownRecipient(UserId),

    #[error("The receipt has no items")]
    EmptySelection,

    #[error("A signature is required")]
    MissingSignature,

    #[error("Invalid signature: {0}")]
    InvalidSignature(&'static str),

    #[error("Signatures are only captured when issuing a new receipt")]
    SignatureNotAccepted,

    #[error("Inventory changed since it was loaded; refresh before submitting again")]
    StaleSnapshot,
}

impl DraftError {
    pub fn code(&self) -> &'static str {
        match self {
            DraftError::MissingRecipient => "MISSING_RECIPIENT",
            DraftError::UnknownRecipient(_) => "UNKNOWN_RECIPIENT",
            DraftError::EmptySelection => "EMPTY_SELECTION",
            DraftError::MissingSignature => "MISSING_SIGNATURE",
            DraftError::InvalidSignature(_) => "INVALID_SIGNATURE",
            DraftError::SignatureNotAccepted => "SIGNATURE_NOT_ACCEPTED",
            DraftError::StaleSnapshot => "STALE_SNAPSHOT",
        }
    }

    pub fn message(&self) -> LocalizedMessage {
        match self {
            DraftError::MissingRecipient => {
                LocalizedMessage::new("Please select a recipient", "יש לבחור חותם")
            }
            DraftError::UnknownRecipient(id) => LocalizedMessage::new(
                format!("User {} was not found", id),
                format!("המשתמש {} לא נמצא", id),
            ),
            DraftError::EmptySelection => LocalizedMessage::new(
                "Add at least one item to the receipt",
                "יש להוסיף לפחות פריט אחד לקבלה",
            ),
            DraftError::MissingSignature => {
                LocalizedMessage::new("A signature is required", "נדרשת חתימה")
            }
            DraftError::InvalidSignature(reason) => LocalizedMessage::new(
                format!("Invalid signature: {}", reason),
                "החתימה אינה תקינה",
            ),
            DraftError::SignatureNotAccepted => LocalizedMessage::new(
                "A signature is only captured when issuing a new receipt",
                "חתימה נדרשת רק בעת יצירת קבלה חדשה",
            ),
            DraftError::StaleSnapshot => LocalizedMessage::new(
                "Some items are no longer available. Refresh the item list before submitting again",
                "חלק מהפריטים כבר אינם זמינים. יש לרענן את רשימת הפריטים לפני שליחה חוזרת",
            ),
        }
    }
}
