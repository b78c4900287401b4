//! Cart Chassis
//!
//! A user's pair of carts: the now-bin they are about to buy and the
//! later-bin of saved items. The chassis is never stored. It is resolved
//! per request and handed by `&mut` to the operations that change it.
//!
//! Once checkout has turned the now-bin into a processing cart, the chassis
//! keeps that cart as its purchase bin until the payment is settled.

use crate::domain::{
    carts::records::{CartItemRecord, CartRecord},
    users::records::UserUuid,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartChassis {
    user: UserUuid,
    now_bin: Option<CartRecord>,
    later_bin: Option<CartRecord>,
    purchase_bin: Option<CartRecord>,
}

impl CartChassis {
    /// An unresolved chassis for `user`.
    pub fn new(user: UserUuid) -> Self {
        Self {
            user,
            now_bin: None,
            later_bin: None,
            purchase_bin: None,
        }
    }

    pub(crate) fn with_bins(user: UserUuid, now_bin: CartRecord, later_bin: CartRecord) -> Self {
        Self {
            user,
            now_bin: Some(now_bin),
            later_bin: Some(later_bin),
            purchase_bin: None,
        }
    }

    pub fn user(&self) -> UserUuid {
        self.user
    }

    /// The cart being bought, if resolved.
    pub fn now_bin(&self) -> Option<&CartRecord> {
        self.now_bin.as_ref()
    }

    pub fn later_bin(&self) -> Option<&CartRecord> {
        self.later_bin.as_ref()
    }

    /// The cart a payment applies to: the processing cart checkout prepared,
    /// or the now-bin before checkout has run.
    pub fn purchase_bin(&self) -> Option<&CartRecord> {
        self.purchase_bin.as_ref().or(self.now_bin.as_ref())
    }

    /// The processing cart checkout prepared, if any.
    pub(crate) fn prepared_bin(&self) -> Option<&CartRecord> {
        self.purchase_bin.as_ref()
    }

    pub(crate) fn set_purchase_bin(&mut self, cart: Option<CartRecord>) {
        self.purchase_bin = cart;
    }

    /// Forgets whichever cart [`Self::purchase_bin`] returns.
    pub(crate) fn clear_purchase_bin(&mut self) {
        if self.purchase_bin.take().is_none() {
            self.now_bin = None;
        }
    }

    pub(crate) fn set_now_bin(&mut self, cart: Option<CartRecord>) {
        self.now_bin = cart;
    }

    pub(crate) fn set_later_bin(&mut self, cart: Option<CartRecord>) {
        self.later_bin = cart;
    }

    pub fn now_items(&self) -> &[CartItemRecord] {
        self.now_bin.as_ref().map_or(&[], |cart| cart.items.as_slice())
    }

    pub fn later_items(&self) -> &[CartItemRecord] {
        self.later_bin
            .as_ref()
            .map_or(&[], |cart| cart.items.as_slice())
    }

    pub fn now_count(&self) -> usize {
        self.now_items().len()
    }

    pub fn later_count(&self) -> usize {
        self.later_items().len()
    }

    pub fn all_count(&self) -> usize {
        self.now_count() + self.later_count()
    }

    /// True when there is something to buy and every item can be paid for.
    pub fn can_proceed_to_payment(&self) -> bool {
        let items = self.now_items();

        !items.is_empty() && items.iter().all(CartItemRecord::is_ready_for_payment)
    }

    /// Whether the user may choose to pay by cheque.
    pub fn payment_by_cheque_allowed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use wellington::{carts::CartStatus, items::ItemKind};

    use crate::domain::{
        carts::records::{Acquirable, Benefitable, CartItemUuid, CartUuid},
        contacts::records::ContactUuid,
        memberships::records::MembershipUuid,
    };

    use super::*;

    fn cart(user: UserUuid, status: CartStatus, items: Vec<CartItemRecord>) -> CartRecord {
        CartRecord {
            uuid: CartUuid::new(),
            user_uuid: user,
            status,
            active_from: Timestamp::UNIX_EPOCH,
            active_to: None,
            items,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn membership(contact: Option<ContactUuid>) -> CartItemRecord {
        CartItemRecord {
            uuid: CartItemUuid::new(),
            cart_uuid: CartUuid::new(),
            kind: ItemKind::Membership,
            acquirable: Acquirable::Membership(MembershipUuid::new()),
            benefitable: contact.map(Benefitable::Contact),
            holdable: None,
            item_name: "Adult".to_string(),
            item_price_cents: 37_000,
            later: false,
            available: true,
            processed: false,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn unresolved_chassis_is_empty() {
        let chassis = CartChassis::new(UserUuid::new());

        assert_eq!(chassis.all_count(), 0);
        assert!(!chassis.can_proceed_to_payment());
        assert!(chassis.payment_by_cheque_allowed());
    }

    #[test]
    fn counts_both_bins() {
        let user = UserUuid::new();
        let chassis = CartChassis::with_bins(
            user,
            cart(user, CartStatus::Pending, vec![membership(None)]),
            cart(
                user,
                CartStatus::ForLater,
                vec![membership(None), membership(None)],
            ),
        );

        assert_eq!(chassis.now_count(), 1);
        assert_eq!(chassis.later_count(), 2);
        assert_eq!(chassis.all_count(), 3);
    }

    #[test]
    fn proceeds_only_when_every_item_is_ready() {
        let user = UserUuid::new();
        let later = cart(user, CartStatus::ForLater, Vec::new());

        let ready = CartChassis::with_bins(
            user,
            cart(
                user,
                CartStatus::Pending,
                vec![membership(Some(ContactUuid::new()))],
            ),
            later.clone(),
        );

        let missing_beneficiary = CartChassis::with_bins(
            user,
            cart(
                user,
                CartStatus::Pending,
                vec![membership(Some(ContactUuid::new())), membership(None)],
            ),
            later.clone(),
        );

        let empty =
            CartChassis::with_bins(user, cart(user, CartStatus::Pending, Vec::new()), later);

        assert!(ready.can_proceed_to_payment());
        assert!(!missing_beneficiary.can_proceed_to_payment());
        assert!(!empty.can_proceed_to_payment());
    }

    #[test]
    fn clearing_the_now_bin_leaves_later_alone() {
        let user = UserUuid::new();
        let mut chassis = CartChassis::with_bins(
            user,
            cart(user, CartStatus::Pending, vec![membership(None)]),
            cart(user, CartStatus::ForLater, vec![membership(None)]),
        );

        chassis.set_now_bin(None);

        assert!(chassis.purchase_bin().is_none());
        assert_eq!(chassis.later_count(), 1);
    }

    #[test]
    fn prepared_cart_takes_over_as_purchase_bin() {
        let user = UserUuid::new();
        let fresh = cart(user, CartStatus::Pending, Vec::new());
        let processing = cart(user, CartStatus::Processing, vec![membership(None)]);
        let mut chassis = CartChassis::with_bins(
            user,
            fresh.clone(),
            cart(user, CartStatus::ForLater, Vec::new()),
        );

        chassis.set_purchase_bin(Some(processing.clone()));

        assert_eq!(chassis.purchase_bin(), Some(&processing));
        assert_eq!(chassis.now_bin(), Some(&fresh));

        chassis.clear_purchase_bin();

        assert_eq!(chassis.purchase_bin(), Some(&fresh));
        assert_eq!(chassis.now_bin(), Some(&fresh));

        chassis.clear_purchase_bin();

        assert!(chassis.purchase_bin().is_none());
        assert!(chassis.now_bin().is_none());
    }
}
