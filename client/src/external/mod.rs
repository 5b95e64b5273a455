//! Backend integrations
//!
//! The receipt session talks to the backend only through these traits so the
//! same flow runs against the REST client and against in-process fakes.

pub mod equipment_api;

pub use equipment_api::EquipmentApiClient;

use shared::{CreateReceiptRequest, InventoryUnit, Receipt, ReceiptId, UpdateReceiptRequest, User};

use crate::error::ClientResult;

/// Source of the units currently available for issue
#[allow(async_fn_in_trait)]
pub trait InventorySource {
    async fn fetch_available(&self) -> ClientResult<Vec<InventoryUnit>>;
}

/// Directory of users that can sign for equipment
#[allow(async_fn_in_trait)]
pub trait UserDirectory {
    async fn fetch_users(&self) -> ClientResult<Vec<User>>;
}

/// Receipt persistence
///
/// A 409 from create or update surfaces as [`crate::error::ClientError::Conflict`]
/// carrying the raw conflict body.
#[allow(async_fn_in_trait)]
pub trait ReceiptSink {
    async fn fetch_receipt(&self, id: &ReceiptId) -> ClientResult<Receipt>;
    async fn create_receipt(&self, request: &CreateReceiptRequest) -> ClientResult<Receipt>;
    async fn update_receipt(&self, id: &ReceiptId, request: &UpdateReceiptRequest) -> ClientResult<Receipt>;
    async fn return_receipt(&self, id: &ReceiptId) -> ClientResult<Receipt>;
}
