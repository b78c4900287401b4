//! Contact Data

use crate::domain::{contacts::records::ContactUuid, users::records::UserUuid};

/// New Contact Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub uuid: ContactUuid,
    pub user_uuid: UserUuid,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
}
