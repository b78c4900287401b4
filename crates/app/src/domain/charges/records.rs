//! Charge Records

use jiff::Timestamp;
use wellington::charges::{ChargeLine, ChargeState, Transfer};

use crate::{
    domain::{
        carts::records::CartUuid, reservations::records::ReservationUuid,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Charge UUID
pub type ChargeUuid = TypedUuid<ChargeRecord>;

/// What a charge pays towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Buyable {
    Cart(CartUuid),
    Reservation(ReservationUuid),
}

impl Buyable {
    pub const CART: &'static str = "cart";
    pub const RESERVATION: &'static str = "reservation";

    pub const fn type_str(self) -> &'static str {
        match self {
            Self::Cart(_) => Self::CART,
            Self::Reservation(_) => Self::RESERVATION,
        }
    }

    pub fn uuid(self) -> uuid::Uuid {
        match self {
            Self::Cart(cart) => cart.into_uuid(),
            Self::Reservation(reservation) => reservation.into_uuid(),
        }
    }
}

/// A payment attempt recorded against a cart or a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRecord {
    pub uuid: ChargeUuid,
    pub user_uuid: UserUuid,
    pub buyable: Buyable,
    pub amount_cents: i64,
    pub state: ChargeState,
    pub transfer: Transfer,
    pub site_selection: bool,
    pub comment: String,
    pub created_at: Timestamp,
}

impl ChargeRecord {
    /// The part of the charge the balance calculations care about.
    pub fn line(&self) -> ChargeLine {
        ChargeLine {
            amount_cents: self.amount_cents,
            state: self.state,
            site_selection: self.site_selection,
        }
    }
}
