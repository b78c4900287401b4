//! Checkout
//!
//! Book-keeping for preparing a cart for payment: which items were claimed,
//! what they add up to and whether the processing cart is complete.

use std::fmt;

use serde::Serialize;

/// Which input the checkout was prepared from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPath {
    /// A single cart. Items are moved into a separate processing cart.
    BareCart,

    /// A user's now-bin, flipped to processing in place.
    Chassis,
}

impl fmt::Display for CheckoutPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BareCart => "bare_cart",
            Self::Chassis => "chassis",
        })
    }
}

/// Result of one per-item checkout step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// A reservation was claimed for the item.
    Claimed,

    /// The item already held a reservation, so nothing was claimed.
    AlreadyHeld,

    /// The step was rolled back.
    Failed {
        /// Human readable cause.
        reason: String,
    },
}

impl StepOutcome {
    /// Whether the item ends the step holding a reservation.
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Claimed | Self::AlreadyHeld)
    }
}

/// What a finished preparation amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conclusion {
    /// Whether every membership item made it into the processing cart.
    pub ready: bool,

    /// Amount to charge, zero unless ready.
    pub amount_cents: i64,
}

/// Running tally of a checkout preparation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparationTally {
    baseline: usize,
    owed_cents: i64,
    claimed: usize,
    held: usize,
    failed: usize,
}

impl PreparationTally {
    /// Starts a tally for a cart holding `baseline` membership items.
    pub fn new(baseline: usize) -> Self {
        Self {
            baseline,
            ..Self::default()
        }
    }

    /// Records a step and, for steps that left the item holding a
    /// reservation, the reservation's outstanding balance.
    pub fn record(&mut self, outcome: &StepOutcome, owed_cents: i64) {
        match outcome {
            StepOutcome::Claimed => self.claimed += 1,
            StepOutcome::AlreadyHeld => self.held += 1,
            StepOutcome::Failed { .. } => {
                self.failed += 1;
                return;
            }
        }

        self.owed_cents = self.owed_cents.saturating_add(owed_cents);
    }

    /// Membership items present when preparation started.
    pub fn baseline(&self) -> usize {
        self.baseline
    }

    /// Running total in minor units.
    pub fn owed_cents(&self) -> i64 {
        self.owed_cents
    }

    /// Newly claimed items.
    pub fn claimed(&self) -> usize {
        self.claimed
    }

    /// Items that already held a reservation.
    pub fn held(&self) -> usize {
        self.held
    }

    /// Rolled back steps.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Finishes the tally given the number of membership items found in the
    /// processing cart afterwards.
    pub fn conclude(&self, prepared: usize) -> Conclusion {
        let ready = self.baseline > 0 && prepared == self.baseline;

        Conclusion {
            ready,
            amount_cents: if ready { self.owed_cents } else { 0 },
        }
    }
}
