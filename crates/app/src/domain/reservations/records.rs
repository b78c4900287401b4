//! Reservation Records

use jiff::Timestamp;
use wellington::reservations::ReservationState;

use crate::{
    domain::{memberships::records::MembershipUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Reservation UUID
pub type ReservationUuid = TypedUuid<ReservationRecord>;

/// A claimed membership purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRecord {
    pub uuid: ReservationUuid,
    pub membership_number: i64,
    pub state: ReservationState,
    pub created_at: Timestamp,
}

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Links a reservation to the membership it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub reservation_uuid: ReservationUuid,
    pub membership_uuid: MembershipUuid,
    pub active_from: Timestamp,
    pub active_to: Option<Timestamp>,
}

/// Claim UUID
pub type ClaimUuid = TypedUuid<ClaimRecord>;

/// Links a reservation to the user holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    pub uuid: ClaimUuid,
    pub reservation_uuid: ReservationUuid,
    pub user_uuid: UserUuid,
    pub active_from: Timestamp,
    pub active_to: Option<Timestamp>,
}
