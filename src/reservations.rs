//! Reservations

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::status::StatusParseError;

/// Membership number handed to the very first reservation.
pub const FIRST_MEMBERSHIP_NUMBER: i64 = 100;

/// Payment state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    /// Money is still owed.
    Instalment,

    /// Fully settled.
    Paid,

    /// Administratively disabled.
    Disabled,
}

impl ReservationState {
    /// All states.
    pub const ALL: [Self; 3] = [Self::Instalment, Self::Paid, Self::Disabled];

    /// Database representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instalment => "instalment",
            Self::Paid => "paid",
            Self::Disabled => "disabled",
        }
    }

    /// State a freshly claimed reservation starts in.
    ///
    /// Free memberships need no payment, so they start out paid.
    #[must_use]
    pub const fn initial(price_cents: i64) -> Self {
        if price_cents <= 0 {
            Self::Paid
        } else {
            Self::Instalment
        }
    }

    /// Re-derive the state once the outstanding balance is known.
    ///
    /// Disabled reservations stay disabled.
    #[must_use]
    pub const fn reconcile(self, owed_cents: i64) -> Self {
        match self {
            Self::Disabled => Self::Disabled,
            _ if owed_cents <= 0 => Self::Paid,
            _ => Self::Instalment,
        }
    }
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationState {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or_else(|| StatusParseError::new("reservation state", value))
    }
}

/// Next membership number after the highest one issued so far.
pub fn next_membership_number(highest: Option<i64>) -> i64 {
    highest.map_or(FIRST_MEMBERSHIP_NUMBER, |number| {
        number.saturating_add(1).max(FIRST_MEMBERSHIP_NUMBER)
    })
}
