//! Reservations

pub(crate) mod claim;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub(crate) use repository::PgReservationsRepository;

pub use errors::ReservationsServiceError;
pub use service::*;
