//! Charges

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub(crate) use repository::PgChargesRepository;

pub use errors::ChargesServiceError;
pub use service::*;
