//! Membership Data

use jiff::Timestamp;

use crate::domain::memberships::records::MembershipUuid;

/// New Membership Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub uuid: MembershipUuid,
    pub name: String,
    pub price_cents: i64,
    pub active_from: Timestamp,
    pub active_to: Option<Timestamp>,
}
