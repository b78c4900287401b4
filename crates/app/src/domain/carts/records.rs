//! Cart Records

use jiff::Timestamp;
use uuid::Uuid;
use wellington::{
    carts::{CartStatus, is_active_at},
    items::{ItemFacts, ItemKind, ItemStage},
};

use crate::{
    domain::{
        contacts::records::ContactUuid, memberships::records::MembershipUuid,
        reservations::records::ReservationUuid, users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub status: CartStatus,
    pub active_from: Timestamp,
    pub active_to: Option<Timestamp>,
    pub items: Vec<CartItemRecord>,
    pub created_at: Timestamp,
}

impl CartRecord {
    pub fn is_active_at(&self, moment: Timestamp) -> bool {
        is_active_at(self.active_from, self.active_to, moment)
    }

    /// Membership items in the cart.
    pub fn memberships(&self) -> impl Iterator<Item = &CartItemRecord> {
        self.items
            .iter()
            .filter(|item| item.kind == ItemKind::Membership)
    }

    /// Membership items that already hold a reservation.
    pub fn held_membership_count(&self) -> usize {
        self.memberships()
            .filter(|item| item.holdable.is_some())
            .count()
    }
}

/// What a line item buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Acquirable {
    Membership(MembershipUuid),
    Donation,
}

impl Acquirable {
    pub(crate) const MEMBERSHIP: &'static str = "membership";
    pub(crate) const DONATION: &'static str = "donation";

    pub fn kind(self) -> ItemKind {
        match self {
            Self::Membership(_) => ItemKind::Membership,
            Self::Donation => ItemKind::Donation,
        }
    }

    pub(crate) fn type_str(self) -> &'static str {
        match self {
            Self::Membership(_) => Self::MEMBERSHIP,
            Self::Donation => Self::DONATION,
        }
    }

    pub(crate) fn uuid(self) -> Option<Uuid> {
        match self {
            Self::Membership(membership) => Some(membership.into_uuid()),
            Self::Donation => None,
        }
    }
}

/// Who a line item is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Benefitable {
    Contact(ContactUuid),
}

impl Benefitable {
    pub(crate) const CONTACT: &'static str = "contact";

    pub fn contact(self) -> ContactUuid {
        match self {
            Self::Contact(contact) => contact,
        }
    }

    pub(crate) fn type_str(self) -> &'static str {
        match self {
            Self::Contact(_) => Self::CONTACT,
        }
    }

    pub(crate) fn uuid(self) -> Uuid {
        match self {
            Self::Contact(contact) => contact.into_uuid(),
        }
    }
}

/// What a line item turned into at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Holdable {
    Reservation(ReservationUuid),
}

impl Holdable {
    pub(crate) const RESERVATION: &'static str = "reservation";

    pub fn reservation(self) -> ReservationUuid {
        match self {
            Self::Reservation(reservation) => reservation,
        }
    }

    pub(crate) fn type_str(self) -> &'static str {
        match self {
            Self::Reservation(_) => Self::RESERVATION,
        }
    }

    pub(crate) fn uuid(self) -> Uuid {
        match self {
            Self::Reservation(reservation) => reservation.into_uuid(),
        }
    }
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// A cart line item. Name and price are snapshotted when the item is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub kind: ItemKind,
    pub acquirable: Acquirable,
    pub benefitable: Option<Benefitable>,
    pub holdable: Option<Holdable>,
    pub item_name: String,
    pub item_price_cents: i64,
    pub later: bool,
    pub available: bool,
    pub processed: bool,
    pub created_at: Timestamp,
}

impl CartItemRecord {
    pub fn facts(&self) -> ItemFacts {
        ItemFacts {
            kind: self.kind,
            stage: ItemStage::from_flags(self.available, self.processed),
            has_benefitable: self.benefitable.is_some(),
            has_holdable: self.holdable.is_some(),
        }
    }

    pub fn is_ready_for_payment(&self) -> bool {
        self.facts().is_ready_for_payment()
    }

    pub fn reservation(&self) -> Option<ReservationUuid> {
        self.holdable.map(Holdable::reservation)
    }
}
