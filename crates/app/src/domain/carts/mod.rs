//! Carts

pub mod chassis;
pub mod data;
pub mod errors;
pub mod records;
mod repositories;
pub(crate) mod resolution;
pub mod service;

pub(crate) use repositories::{PgCartItemsRepository, PgCartsRepository};

pub use chassis::CartChassis;
pub use errors::CartsServiceError;
pub use service::*;
