//! Charges

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::status::StatusParseError;

/// Outcome of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeState {
    /// Recorded, outcome not yet known.
    Pending,

    /// Money received. Immutable from here on.
    Successful,

    /// Payment did not go through.
    Failed,
}

impl ChargeState {
    /// All states.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Successful, Self::Failed];

    /// Database representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }

    /// Whether a charge in this state may move to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        self != Self::Successful && self != next
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeState {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or_else(|| StatusParseError::new("charge state", value))
    }
}

/// How the money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transfer {
    /// Card payment through Stripe.
    Stripe,

    /// Cash at the desk.
    Cash,

    /// Posted cheque.
    Cheque,

    /// Credit applied by staff.
    Credit,
}

impl Transfer {
    /// All transfer methods.
    pub const ALL: [Self; 4] = [Self::Stripe, Self::Cash, Self::Cheque, Self::Credit];

    /// Database representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Cash => "cash",
            Self::Cheque => "cheque",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transfer {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|transfer| transfer.as_str() == value)
            .ok_or_else(|| StatusParseError::new("transfer", value))
    }
}

/// The parts of a charge that matter when reconciling balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeLine {
    /// Amount in minor units.
    pub amount_cents: i64,

    /// Charge state.
    pub state: ChargeState,

    /// Whether the charge paid for hotel site selection rather than the purchase.
    pub site_selection: bool,
}

impl ChargeLine {
    /// A successful purchase charge.
    pub const fn successful(amount_cents: i64) -> Self {
        Self {
            amount_cents,
            state: ChargeState::Successful,
            site_selection: false,
        }
    }

    /// Whether the charge reduces the balance of what it was charged against.
    pub fn counts_towards_balance(&self) -> bool {
        self.state == ChargeState::Successful && !self.site_selection
    }
}

/// Sum of the charges that count towards a balance.
pub fn successful_total(charges: &[ChargeLine]) -> i64 {
    charges
        .iter()
        .filter(|charge| charge.counts_towards_balance())
        .fold(0_i64, |total, charge| total.saturating_add(charge.amount_cents))
}
