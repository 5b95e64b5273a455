//! Error handling for the equipment receipts client
//!
//! Provides consistent error details in Hebrew and English

use serde::Serialize;
use shared::{
    ConflictBody, DraftError, LocalizedMessage, ReceiptId, ReconcileError, SubmissionConflict, UnitId,
};
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    // Transport and server errors
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Raw 409 body, before it is resolved against a draft's snapshot
    #[error("Backend reported a conflict: {}", .0.error.code)]
    Conflict(ConflictBody),

    // Receipt composition errors
    #[error(transparent)]
    SubmissionConflict(#[from] SubmissionConflict),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Receipt {0} was already returned")]
    ReceiptReturned(ReceiptId),

    // Local errors
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error detail for display and structured output
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_he: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable_item_ids: Vec<UnitId>,
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Server { .. } => "SERVER_ERROR",
            ClientError::Unauthorized => "UNAUTHORIZED",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Conflict(_) => "CONFLICT",
            ClientError::SubmissionConflict(conflict) => conflict.code(),
            ClientError::Draft(err) => err.code(),
            ClientError::Reconcile(err) => err.code(),
            ClientError::ReceiptReturned(_) => "RECEIPT_RETURNED",
            ClientError::InvalidPlan(_) => "INVALID_PLAN",
            ClientError::Export(_) => "EXPORT_ERROR",
            ClientError::Configuration(_) => "CONFIGURATION_ERROR",
            ClientError::Io(_) => "IO_ERROR",
        }
    }

    /// Generic transport/server failures can simply be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn message(&self) -> LocalizedMessage {
        match self {
            ClientError::Transport(_) | ClientError::Server { .. } | ClientError::Decode(_) => {
                LocalizedMessage::new(
                    "The server could not be reached. Please try again",
                    "לא ניתן להתחבר לשרת. יש לנסות שוב",
                )
            }
            ClientError::Unauthorized => {
                LocalizedMessage::new("Please sign in again", "יש להתחבר מחדש")
            }
            ClientError::NotFound(resource) => LocalizedMessage::new(
                format!("{} not found", resource),
                format!("{} לא נמצא", resource),
            ),
            ClientError::Conflict(body) => LocalizedMessage::new(
                body.error
                    .message
                    .clone()
                    .unwrap_or_else(|| "The request conflicts with the current state".to_string()),
                "הבקשה מתנגשת עם המצב הנוכחי",
            ),
            ClientError::SubmissionConflict(conflict) => conflict.message(),
            ClientError::Draft(err) => err.message(),
            ClientError::Reconcile(err) => err.message(),
            ClientError::ReceiptReturned(id) => LocalizedMessage::new(
                format!("Receipt {} was already returned and cannot be edited", id),
                format!("הקבלה {} כבר הוחזרה ולא ניתן לערוך אותה", id),
            ),
            ClientError::InvalidPlan(msg) => LocalizedMessage::new(
                format!("Invalid plan: {}", msg),
                format!("תוכנית לא תקינה: {}", msg),
            ),
            ClientError::Export(msg) => LocalizedMessage::new(
                format!("Export failed: {}", msg),
                "הייצוא נכשל",
            ),
            ClientError::Configuration(msg) => LocalizedMessage::new(
                format!("Configuration error: {}", msg),
                format!("שגיאת הגדרות: {}", msg),
            ),
            ClientError::Io(err) => LocalizedMessage::new(
                format!("File error: {}", err),
                format!("שגיאת קובץ: {}", err),
            ),
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        let message = self.message();
        ErrorDetail {
            code: self.code().to_string(),
            message_en: message.en,
            message_he: message.he,
            unavailable_item_ids: match self {
                ClientError::SubmissionConflict(conflict) => conflict.unavailable_ids(),
                _ => Vec::new(),
            },
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
