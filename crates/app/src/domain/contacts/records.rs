//! Contact Records

use jiff::Timestamp;
use wellington::description::BeneficiaryName;

use crate::{
    domain::{reservations::records::ClaimUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Contact UUID
pub type ContactUuid = TypedUuid<ContactRecord>;

/// Contact Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub uuid: ContactUuid,
    pub user_uuid: UserUuid,
    pub claim_uuid: Option<ClaimUuid>,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub created_at: Timestamp,
}

impl ContactRecord {
    /// Names used when describing what was bought for this contact.
    pub fn beneficiary_name(&self) -> BeneficiaryName {
        BeneficiaryName::from_parts(
            &self.first_name,
            &self.last_name,
            self.preferred_name.as_deref(),
        )
    }
}
