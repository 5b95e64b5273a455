//! Domain models for equipment receipts

mod inventory;
mod receipt;
mod user;

pub use inventory::*;
pub use receipt::*;
pub use user::*;
