//! Registration Domain Concerns

pub mod carts;
pub mod charges;
pub mod checkout;
pub(crate) mod columns;
pub mod contacts;
pub mod memberships;
pub mod reconciliation;
pub mod reservations;
pub mod users;
