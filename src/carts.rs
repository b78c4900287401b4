//! Carts

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::status::StatusParseError;

/// Lifecycle status of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Saved items the user is not ready to buy yet.
    ForLater,

    /// The user's current shopping cart.
    Pending,

    /// Mid-transition from pending items to claimed reservations.
    Processing,

    /// Closed out pending a cheque.
    AwaitingCheque,

    /// Fully settled.
    Paid,
}

impl CartStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::ForLater,
        Self::Pending,
        Self::Processing,
        Self::AwaitingCheque,
        Self::Paid,
    ];

    /// Database representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ForLater => "for_later",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::AwaitingCheque => "awaiting_cheque",
            Self::Paid => "paid",
        }
    }

    /// Whether a user may hold at most one active cart with this status.
    pub const fn is_unique_per_user(self) -> bool {
        matches!(self, Self::ForLater | Self::Pending)
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartStatus {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| StatusParseError::new("cart status", value))
    }
}

/// Whether a half-open `[active_from, active_to)` interval covers `moment`.
///
/// An open-ended interval (`active_to` of `None`) stays active forever.
pub fn is_active_at(
    active_from: Timestamp,
    active_to: Option<Timestamp>,
    moment: Timestamp,
) -> bool {
    active_from <= moment && active_to.is_none_or(|to| moment < to)
}
