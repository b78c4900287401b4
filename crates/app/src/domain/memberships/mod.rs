//! Memberships

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub(crate) use repository::PgMembershipsRepository;

pub use errors::MembershipsServiceError;
pub use service::*;
