//! Charges service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use wellington::{charges::ChargeState, ledger::LedgerError};

#[derive(Debug, Error)]
pub enum ChargesServiceError {
    #[error("charge already exists")]
    AlreadyExists,

    #[error("charge not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("charge cannot move from {from} to {to}")]
    InvalidTransition { from: ChargeState, to: ChargeState },

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ChargesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
