//! Cart Data

use wellington::carts::CartStatus;

use crate::domain::{
    carts::records::{Acquirable, Benefitable, CartItemUuid, CartUuid},
    contacts::records::ContactUuid,
    memberships::records::MembershipUuid,
    users::records::UserUuid,
};

/// New Cart Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCart {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub status: CartStatus,
}

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub uuid: CartItemUuid,
    pub acquirable: Acquirable,
    pub benefitable: Option<Benefitable>,

    /// Amount for donations. Memberships take their catalogue price.
    pub donation_cents: i64,
}

impl NewCartItem {
    /// A membership, optionally already assigned to a contact.
    pub fn membership(membership: MembershipUuid, contact: Option<ContactUuid>) -> Self {
        Self {
            uuid: CartItemUuid::new(),
            acquirable: Acquirable::Membership(membership),
            benefitable: contact.map(Benefitable::Contact),
            donation_cents: 0,
        }
    }

    /// A donation of the given amount.
    pub fn donation(amount_cents: i64) -> Self {
        Self {
            uuid: CartItemUuid::new(),
            acquirable: Acquirable::Donation,
            benefitable: None,
            donation_cents: amount_cents,
        }
    }
}
