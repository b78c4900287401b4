//! Checkout
//!
//! Turns carts into reservations ready for payment, sweeps up after failed
//! attempts and retires carts once they are paid or waiting for a cheque.

pub mod errors;
mod housekeeping;
mod preparation;
pub mod records;
mod recovery;
pub mod service;

pub use errors::CheckoutServiceError;
pub use service::*;
