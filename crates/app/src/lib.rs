//! Membership registration services: carts, reservations, charges and checkout.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod notifications;
pub mod observability;

#[cfg(test)]
mod test;

mod uuids;
