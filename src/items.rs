//! Cart items

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::status::StatusParseError;

/// What a cart line item purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A membership, claimed as a reservation at checkout.
    Membership,

    /// A free-form donation.
    Donation,
}

impl ItemKind {
    /// All item kinds.
    pub const ALL: [Self; 2] = [Self::Membership, Self::Donation];

    /// Database representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::Donation => "donation",
        }
    }

    /// Whether items of this kind need a beneficiary before checkout.
    pub const fn requires_benefitable(self) -> bool {
        matches!(self, Self::Membership)
    }

    /// Whether items of this kind turn into reservations.
    pub const fn is_claimable(self) -> bool {
        matches!(self, Self::Membership)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| StatusParseError::new("item kind", value))
    }
}

/// Where a line item stands between being added and being settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    /// On sale at the snapshotted name and price, not yet paid for.
    Open,

    /// No longer on sale at the snapshotted name and price.
    Unavailable,

    /// Post-payment housekeeping already handled the item.
    Processed,
}

impl ItemStage {
    /// Stage from the stored availability and processing flags.
    ///
    /// Processing wins, since a settled item stays settled.
    pub const fn from_flags(available: bool, processed: bool) -> Self {
        match (available, processed) {
            (_, true) => Self::Processed,
            (false, false) => Self::Unavailable,
            (true, false) => Self::Open,
        }
    }
}

/// What decides whether a line item can be paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFacts {
    /// Item kind.
    pub kind: ItemKind,

    /// Sale and settlement stage.
    pub stage: ItemStage,

    /// Whether a beneficiary is attached.
    pub has_benefitable: bool,

    /// Whether a reservation is already held.
    pub has_holdable: bool,
}

impl ItemFacts {
    /// Whether the item may be included in a payment.
    pub fn is_ready_for_payment(&self) -> bool {
        matches!(self.stage, ItemStage::Open)
            && (self.has_benefitable || !self.kind.requires_benefitable())
    }

    /// Whether checkout still needs to claim a reservation for this item.
    pub fn needs_claim(&self) -> bool {
        self.kind.is_claimable() && !self.has_holdable
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn membership() -> ItemFacts {
        ItemFacts {
            kind: ItemKind::Membership,
            stage: ItemStage::Open,
            has_benefitable: true,
            has_holdable: false,
        }
    }

    #[test]
    fn kinds_parse_from_database_strings() -> TestResult {
        assert_eq!("membership".parse::<ItemKind>()?, ItemKind::Membership, "membership kind");
        assert_eq!("donation".parse::<ItemKind>()?, ItemKind::Donation, "donation kind");
        assert!("hotel".parse::<ItemKind>().is_err(), "unknown kinds are rejected");

        Ok(())
    }

    #[test]
    fn membership_with_beneficiary_is_ready() {
        assert!(membership().is_ready_for_payment(), "complete membership should be ready");
    }

    #[test]
    fn membership_without_beneficiary_is_not_ready() {
        let item = ItemFacts {
            has_benefitable: false,
            ..membership()
        };

        assert!(!item.is_ready_for_payment(), "memberships need a beneficiary");
    }

    #[test]
    fn donations_do_not_need_a_beneficiary() {
        let item = ItemFacts {
            kind: ItemKind::Donation,
            has_benefitable: false,
            ..membership()
        };

        assert!(item.is_ready_for_payment(), "donations are ready without a beneficiary");
        assert!(!item.needs_claim(), "donations never claim reservations");
    }

    #[test]
    fn unavailable_or_processed_items_are_not_ready() {
        let unavailable = ItemFacts {
            stage: ItemStage::Unavailable,
            ..membership()
        };
        let processed = ItemFacts {
            stage: ItemStage::Processed,
            ..membership()
        };

        assert!(!unavailable.is_ready_for_payment(), "unavailable items are not ready");
        assert!(!processed.is_ready_for_payment(), "processed items are not ready");
    }

    #[test]
    fn processing_outranks_availability() {
        assert_eq!(ItemStage::from_flags(true, false), ItemStage::Open, "on sale");
        assert_eq!(ItemStage::from_flags(false, false), ItemStage::Unavailable, "withdrawn");
        assert_eq!(ItemStage::from_flags(false, true), ItemStage::Processed, "settled");
        assert_eq!(ItemStage::from_flags(true, true), ItemStage::Processed, "settled");
    }

    #[test]
    fn held_items_do_not_need_a_claim() {
        let held = ItemFacts {
            has_holdable: true,
            ..membership()
        };

        assert!(membership().needs_claim(), "fresh memberships need a claim");
        assert!(!held.needs_claim(), "held memberships skip the claim");
    }
}
