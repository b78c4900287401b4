//! Reconciliation
//!
//! Works out what is still owed for reservations and carts from the charges
//! recorded against them.

pub mod errors;
pub(crate) mod ledgers;
pub mod service;

pub use errors::ReconciliationServiceError;
pub use service::*;
