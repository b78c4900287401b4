//! Recovery
//!
//! Rules for sweeping processing carts left behind by abandoned checkouts.

use crate::{items::ItemKind, reservations::ReservationState};

/// Returned by recovery when there is no cart to recover items into.
pub const RECOVERY_UNRESOLVABLE: i64 = -1;

/// The reservation held by a swept item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldReservation {
    /// Reservation state.
    pub state: ReservationState,

    /// Price of the reserved membership.
    pub price_cents: i64,

    /// Outstanding balance.
    pub owed_cents: i64,
}

/// An item found in an abandoned processing cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweptItem {
    /// Item kind.
    pub kind: ItemKind,

    /// Held reservation, if one was claimed.
    pub reservation: Option<HeldReservation>,
}

impl SweptItem {
    /// Whether checkout never got anywhere with this item, so it should be
    /// handed back to the user.
    pub fn is_unprocessed(&self) -> bool {
        match self.reservation {
            None => self.kind == ItemKind::Membership,
            Some(reservation) => {
                reservation.state == ReservationState::Instalment
                    && reservation.price_cents > 0
                    && reservation.owed_cents == reservation.price_cents
            }
        }
    }

    /// Whether nothing more is owed for this item.
    ///
    /// Items without a reservation have nothing to settle.
    pub fn is_settled(&self) -> bool {
        self.reservation.is_none_or(|reservation| {
            matches!(
                reservation.state,
                ReservationState::Paid | ReservationState::Disabled
            ) || reservation.owed_cents <= 0
        })
    }
}

/// What to do with a swept cart once its unprocessed items are gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    /// Nothing left, close it.
    Close,

    /// Everything left is settled, mark it paid and close it.
    MarkPaid,

    /// Something is partially paid, leave it open.
    KeepOpen,
}

impl Retirement {
    /// Decides the fate of a swept cart from the items that stayed in it.
    pub fn for_remaining<'a>(remaining: impl IntoIterator<Item = &'a SweptItem>) -> Self {
        let mut remaining = remaining.into_iter().peekable();

        if remaining.peek().is_none() {
            return Self::Close;
        }

        if remaining.all(SweptItem::is_settled) {
            Self::MarkPaid
        } else {
            Self::KeepOpen
        }
    }
}
