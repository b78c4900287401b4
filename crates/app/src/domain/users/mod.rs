//! Users

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub(crate) use repository::PgUsersRepository;

pub use errors::UsersServiceError;
pub use service::*;
