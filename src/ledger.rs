//! Ledgers
//!
//! Outstanding balances for reservations and carts, derived from charge history.
//! Amounts are integer minor units; [`Money`] only appears at the edges.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::charges::{ChargeLine, successful_total};

/// Errors raised when validating a payment against a ledger.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Payments must move a positive amount.
    #[error("payment amount must be positive, got {amount_cents}")]
    NonPositiveAmount {
        /// Requested amount.
        amount_cents: i64,
    },

    /// Payment exceeds the outstanding balance.
    #[error("refusing to overpay: {amount_cents} requested but only {owed_cents} owed")]
    Overpayment {
        /// Requested amount.
        amount_cents: i64,

        /// Outstanding balance.
        owed_cents: i64,
    },
}

/// Price and charges of one cart line item.
///
/// `charges` are the charges against the reservation the item holds, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemLedger {
    /// Snapshotted price in minor units.
    pub price_cents: i64,

    /// Charges against the held reservation.
    pub charges: Vec<ChargeLine>,
}

impl ItemLedger {
    /// Price less the successful charges against the held reservation.
    pub fn owed_cents(&self) -> i64 {
        self.price_cents.saturating_sub(successful_total(&self.charges))
    }
}

/// Items and cart-level charges of one cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartLedger {
    /// Line items.
    pub items: Vec<ItemLedger>,

    /// Charges made against the cart itself.
    pub charges: Vec<ChargeLine>,
}

impl CartLedger {
    /// Outstanding balance of the cart.
    pub fn owed_cents(&self) -> i64 {
        let items = self
            .items
            .iter()
            .fold(0_i64, |total, item| total.saturating_add(item.owed_cents()));

        items.saturating_sub(successful_total(&self.charges))
    }
}

/// Membership price and charges of one reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationLedger {
    /// Membership price in minor units.
    pub price_cents: i64,

    /// Charges against the reservation.
    pub charges: Vec<ChargeLine>,

    /// Outstanding balances of the carts that hold this reservation.
    pub related_cart_balances: SmallVec<[i64; 2]>,
}

impl ReservationLedger {
    /// Outstanding balance of the reservation.
    ///
    /// When the reservation was bought through one or more carts and those carts
    /// are settled between them, the cart paid for it and nothing is owed.
    pub fn owed_cents(&self) -> i64 {
        if !self.related_cart_balances.is_empty() {
            let carts = self
                .related_cart_balances
                .iter()
                .fold(0_i64, |total, owed| total.saturating_add(*owed));

            if carts <= 0 {
                return 0;
            }
        }

        self.price_cents.saturating_sub(successful_total(&self.charges))
    }
}

/// Converts minor units into [`Money`].
pub fn money(cents: i64, currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(cents, currency)
}

/// Checks that a payment of `amount_cents` fits within `owed_cents`.
///
/// # Errors
///
/// Returns [`LedgerError::NonPositiveAmount`] for zero or negative amounts and
/// [`LedgerError::Overpayment`] when the amount exceeds the balance.
pub fn validate_payment(amount_cents: i64, owed_cents: i64) -> Result<(), LedgerError> {
    if amount_cents <= 0 {
        return Err(LedgerError::NonPositiveAmount { amount_cents });
    }

    if amount_cents > owed_cents {
        return Err(LedgerError::Overpayment {
            amount_cents,
            owed_cents,
        });
    }

    Ok(())
}
