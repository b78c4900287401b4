//! Checkout service errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::carts::CartsServiceError;

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("cart not found")]
    NotFound,

    /// The carts involved are not in a state checkout can work from.
    #[error("carts are in an inconsistent state")]
    InconsistentCartState,

    #[error(transparent)]
    Carts(CartsServiceError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CheckoutServiceError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            other => Self::Sql(other),
        }
    }
}

impl From<CartsServiceError> for CheckoutServiceError {
    fn from(error: CartsServiceError) -> Self {
        match error {
            CartsServiceError::InconsistentCartState => Self::InconsistentCartState,
            CartsServiceError::NotFound => Self::NotFound,
            CartsServiceError::Sql(error) => Self::Sql(error),
            other => Self::Carts(other),
        }
    }
}
