//! Wellington
//!
//! Checkout engine for a convention membership registration system: cart and
//! reservation statuses, balances derived from charge history, checkout
//! completeness and the rules for recovering abandoned checkouts.

pub mod carts;
pub mod charges;
pub mod checkout;
pub mod description;
pub mod items;
pub mod ledger;
pub mod recovery;
pub mod reservations;
pub mod status;
