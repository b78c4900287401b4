//! Contacts
//!
//! The people memberships are bought for.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub(crate) use repository::PgContactsRepository;

pub use errors::ContactsServiceError;
pub use service::*;
