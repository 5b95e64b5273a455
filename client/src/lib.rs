//! Equipment receipts client
//!
//! Talks to the equipment tracking backend and drives the shared receipt
//! composition core: fetching the available-items snapshot and the user
//! list, reconciling requested quantities into concrete units, and
//! submitting the result.

pub mod config;
pub mod error;
pub mod external;
pub mod services;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{ClientError, ClientResult, ErrorDetail};
pub use external::{EquipmentApiClient, InventorySource, ReceiptSink, UserDirectory};
pub use services::{return_receipt, selection_csv, ReceiptPlan, ReceiptSession};
