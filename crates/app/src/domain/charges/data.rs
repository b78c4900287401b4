//! Charge Data

use wellington::charges::Transfer;

use crate::domain::{
    charges::records::{Buyable, ChargeUuid},
    users::records::UserUuid,
};

/// New Charge Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCharge {
    pub uuid: ChargeUuid,
    pub user_uuid: UserUuid,
    pub buyable: Buyable,
    pub amount_cents: i64,
    pub transfer: Transfer,
    /// Site selection deposits are tracked separately from the membership balance.
    pub site_selection: bool,
    pub comment: String,
}
