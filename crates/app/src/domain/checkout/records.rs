//! Checkout Records

use rusty_money::{Money, iso::Currency};
use wellington::checkout::{CheckoutPath, StepOutcome};

use crate::domain::carts::records::{CartItemUuid, CartRecord};

/// Result of preparing a cart for payment.
#[derive(Debug, Clone, PartialEq)]
pub struct Preparation {
    pub path: CheckoutPath,

    /// Every membership item in scope holds a reservation.
    pub ready: bool,

    /// Zero unless `ready`.
    pub amount_to_charge: Money<'static, Currency>,

    /// The `processing` cart the payment applies to.
    pub processing_cart: CartRecord,

    /// What happened to each membership item, in cart order.
    pub outcomes: Vec<(CartItemUuid, StepOutcome)>,
}
