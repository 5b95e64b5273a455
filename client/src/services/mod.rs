//! Receipt workflows built on the shared composition core

pub mod export;
pub mod plan;
pub mod session;

pub use export::selection_csv;
pub use plan::ReceiptPlan;
pub use session::{return_receipt, ReceiptSession};
