//! Shared receipt-composition core for the equipment tracking platform
//!
//! This crate contains the pure, in-memory logic shared between the client,
//! the browser bridge (via WASM) and their tests: the inventory data model,
//! item grouping, quantity reconciliation, the selection model and the
//! submission payloads. Nothing in here performs I/O.

pub mod draft;
pub mod errors;
pub mod grouping;
pub mod models;
pub mod reconciler;
pub mod selection;
pub mod snapshot;
pub mod submission;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use draft::*;
pub use errors::*;
pub use grouping::*;
pub use models::*;
pub use reconciler::*;
pub use selection::*;
pub use snapshot::*;
pub use submission::*;
pub use types::*;
pub use validation::*;
