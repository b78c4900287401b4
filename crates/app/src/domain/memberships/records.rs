//! Membership Records

use jiff::Timestamp;
use wellington::carts::is_active_at;

use crate::uuids::TypedUuid;

/// Membership UUID
pub type MembershipUuid = TypedUuid<MembershipRecord>;

/// A purchasable membership type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRecord {
    pub uuid: MembershipUuid,
    pub name: String,
    pub price_cents: i64,
    pub active_from: Timestamp,
    pub active_to: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl MembershipRecord {
    /// Whether the membership is on sale at `moment`.
    pub fn is_active_at(&self, moment: Timestamp) -> bool {
        is_active_at(self.active_from, self.active_to, moment)
    }
}
