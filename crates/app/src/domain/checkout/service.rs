//! Checkout service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rusty_money::iso::Currency;
use tracing::{info, warn};
use wellington::{
    carts::CartStatus,
    checkout::CheckoutPath,
    description::CartContentsDescription,
    ledger::money,
};

use crate::{
    config::NotificationConfig,
    database::Db,
    domain::{
        carts::{
            CartChassis, PgCartsRepository,
            records::{CartRecord, CartUuid},
            resolution::{load_cart, resolve_bin},
        },
        checkout::{
            errors::CheckoutServiceError,
            housekeeping::{after_payment_in, await_cheque_in, described_items},
            preparation::{StepRun, run_steps},
            records::Preparation,
            recovery::recover_in,
        },
        reconciliation::ledgers::cart_owed_in,
        users::{PgUsersRepository, records::UserUuid},
    },
    notifications::{CartWaitingForCheque, Notifier},
};

#[derive(Clone)]
pub struct PgCheckoutService {
    db: Db,
    currency: &'static Currency,
    notifications: NotificationConfig,
    notifier: Arc<dyn Notifier>,
    carts_repository: PgCartsRepository,
    users_repository: PgUsersRepository,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(
        db: Db,
        currency: &'static Currency,
        notifications: NotificationConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            currency,
            notifications,
            notifier,
            carts_repository: PgCartsRepository::new(),
            users_repository: PgUsersRepository::new(),
        }
    }

    fn preparation(
        &self,
        path: CheckoutPath,
        run: StepRun,
        processing_cart: CartRecord,
    ) -> Preparation {
        let conclusion = run.tally.conclude(processing_cart.held_membership_count());

        info!(
            %path,
            cart = %processing_cart.uuid,
            ready = conclusion.ready,
            amount_cents = conclusion.amount_cents,
            "prepared cart for payment"
        );

        Preparation {
            path,
            ready: conclusion.ready,
            amount_to_charge: money(conclusion.amount_cents, self.currency),
            processing_cart,
            outcomes: run.outcomes,
        }
    }
}

impl fmt::Debug for PgCheckoutService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCheckoutService")
            .field("currency", &self.currency.iso_alpha_code)
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    async fn prepare_cart_for_payment(
        &self,
        cart: CartUuid,
    ) -> Result<Preparation, CheckoutServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let cart = load_cart(&mut tx, cart).await?;

        if !cart.is_active_at(now)
            || !matches!(cart.status, CartStatus::Pending | CartStatus::Processing)
        {
            return Err(CheckoutServiceError::InconsistentCartState);
        }

        let prepared = if cart.status == CartStatus::Processing {
            Some(cart.clone())
        } else {
            match self
                .carts_repository
                .find_prepared_cart(&mut tx, cart.uuid, now)
                .await?
            {
                Some(prepared) => Some(load_cart(&mut tx, prepared.uuid).await?),
                None => None,
            }
        };

        let mut items: Vec<_> = cart.memberships().cloned().collect();

        if let Some(prepared) = prepared.as_ref().filter(|prepared| prepared.uuid != cart.uuid) {
            items.extend(prepared.memberships().cloned());
        }

        let processing = match prepared {
            Some(prepared) => prepared.uuid,
            None if items.is_empty() => {
                tx.commit().await?;

                return Ok(self.preparation(
                    CheckoutPath::BareCart,
                    StepRun::default(),
                    cart,
                ));
            }
            None => {
                self.carts_repository
                    .create_prepared_cart(&mut tx, CartUuid::new(), &cart, now)
                    .await?
                    .uuid
            }
        };

        let run = run_steps(
            &mut tx,
            &items,
            cart.user_uuid,
            Some(processing),
            items.len(),
            now,
        )
        .await?;

        let processing = load_cart(&mut tx, processing).await?;

        tx.commit().await?;

        Ok(self.preparation(CheckoutPath::BareCart, run, processing))
    }

    async fn prepare_chassis_for_payment(
        &self,
        chassis: &mut CartChassis,
    ) -> Result<Preparation, CheckoutServiceError> {
        let Some(now_bin) = chassis.now_bin().map(|cart| cart.uuid) else {
            return Err(CheckoutServiceError::InconsistentCartState);
        };

        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let cart = load_cart(&mut tx, now_bin).await?;

        if cart.user_uuid != chassis.user() || !cart.is_active_at(now) {
            return Err(CheckoutServiceError::InconsistentCartState);
        }

        match cart.status {
            CartStatus::Pending => {
                self.carts_repository
                    .update_status(&mut tx, cart.uuid, CartStatus::Processing)
                    .await?;
            }
            CartStatus::Processing => {}
            _ => return Err(CheckoutServiceError::InconsistentCartState),
        }

        let items: Vec<_> = cart.memberships().cloned().collect();

        let run = run_steps(&mut tx, &items, cart.user_uuid, None, items.len(), now).await?;

        let fresh = resolve_bin(&mut tx, chassis.user(), None, CartStatus::Pending, now).await?;
        let processing = load_cart(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        chassis.set_now_bin(Some(fresh));
        chassis.set_purchase_bin(Some(processing.clone()));

        Ok(self.preparation(CheckoutPath::Chassis, run, processing))
    }

    async fn recover_failed_processing_items(
        &self,
        destination: Option<CartUuid>,
        user: UserUuid,
    ) -> Result<i64, CheckoutServiceError> {
        let mut tx = self.db.begin().await?;

        let moved = recover_in(&mut tx, destination, user, Timestamp::now()).await?;

        tx.commit().await?;

        Ok(moved)
    }

    async fn after_payment_housekeeping(&self, cart: CartUuid) -> Result<(), CheckoutServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = load_cart(&mut tx, cart).await?;

        after_payment_in(&mut tx, &cart, Timestamp::now()).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn wait_for_cheque_housekeeping(
        &self,
        chassis: &mut CartChassis,
    ) -> Result<(), CheckoutServiceError> {
        let Some(purchase) = chassis.purchase_bin().map(|cart| cart.uuid) else {
            return Err(CheckoutServiceError::InconsistentCartState);
        };

        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let cart = load_cart(&mut tx, purchase).await?;

        if cart.user_uuid != chassis.user()
            || !cart.is_active_at(now)
            || !matches!(cart.status, CartStatus::Pending | CartStatus::Processing)
        {
            return Err(CheckoutServiceError::InconsistentCartState);
        }

        let user = self.users_repository.get_user(&mut tx, cart.user_uuid).await?;
        let owed = cart_owed_in(&mut tx, cart.uuid).await?;
        let items = described_items(&mut tx, &cart).await?;

        await_cheque_in(&mut tx, cart.uuid, now).await?;

        tx.commit().await?;

        chassis.clear_purchase_bin();

        let notice = CartWaitingForCheque {
            user: user.uuid,
            email: user.email,
            item_count: cart.items.len(),
            outstanding: money(owed, self.currency),
            item_descriptions: CartContentsDescription::new()
                .with_unique_ids()
                .full_contact_names()
                .for_email()
                .describe_items(&items),
            transaction_date: now,
            cart: cart.uuid,
            from_address: self.notifications.from_address.clone(),
            reply_to: self.notifications.reply_to.clone(),
        };

        if let Err(error) = self.notifier.cart_waiting_for_cheque(notice).await {
            warn!(cart = %cart.uuid, %error, "failed to send cheque notice");
        }

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Claims reservations for a cart's membership items and gathers them
    /// into a `processing` cart.
    ///
    /// Preparing the same cart again picks up the processing cart the first
    /// call filled. A cart with nothing to prepare is returned as is.
    async fn prepare_cart_for_payment(
        &self,
        cart: CartUuid,
    ) -> Result<Preparation, CheckoutServiceError>;

    /// Flips the chassis's now-bin to `processing`, claims reservations for
    /// its membership items and gives the chassis a fresh now-bin.
    async fn prepare_chassis_for_payment(
        &self,
        chassis: &mut CartChassis,
    ) -> Result<Preparation, CheckoutServiceError>;

    /// Moves items out of the user's abandoned `processing` carts.
    ///
    /// Returns the number of items moved, or `-1` when `destination` cannot
    /// be used.
    async fn recover_failed_processing_items(
        &self,
        destination: Option<CartUuid>,
        user: UserUuid,
    ) -> Result<i64, CheckoutServiceError>;

    /// Closes a cart once payment has been taken.
    async fn after_payment_housekeeping(&self, cart: CartUuid) -> Result<(), CheckoutServiceError>;

    /// Parks the chassis's purchase bin until a cheque arrives and notifies the user.
    ///
    /// After chassis preparation the purchase bin is the processing cart, not
    /// the fresh now-bin.
    async fn wait_for_cheque_housekeeping(
        &self,
        chassis: &mut CartChassis,
    ) -> Result<(), CheckoutServiceError>;
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;
    use wellington::{
        checkout::StepOutcome, recovery::RECOVERY_UNRESOLVABLE, reservations::ReservationState,
    };

    use crate::{
        domain::{
            carts::CartsService,
            charges::records::Buyable,
            reservations::ReservationsService,
        },
        notifications::{MockNotifier, NotifierError},
        test::{
            TestContext,
            helpers::{
                add_membership, create_cart, create_contact, create_membership, create_user,
                now_bin, record_payment,
            },
        },
    };

    use super::*;

    #[tokio::test]
    async fn single_membership_is_ready_for_its_full_price() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 10_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let cart = now_bin(&ctx, user.uuid).await?;
        let item = add_membership(&ctx, cart.uuid, adult.uuid, Some(contact.uuid)).await?;

        let preparation = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;

        assert!(preparation.ready);
        assert_eq!(preparation.path, CheckoutPath::BareCart);
        assert_eq!(preparation.amount_to_charge, money(10_000, USD));
        assert_eq!(preparation.outcomes, vec![(item.uuid, StepOutcome::Claimed)]);
        assert_eq!(preparation.processing_cart.status, CartStatus::Processing);
        assert_ne!(preparation.processing_cart.uuid, cart.uuid);

        let held = preparation
            .processing_cart
            .items
            .first()
            .and_then(|item| item.reservation())
            .ok_or("item should hold a reservation")?;

        let reservation = ctx.reservations.get_reservation(held).await?;

        assert_eq!(reservation.state, ReservationState::Instalment);

        Ok(())
    }

    #[tokio::test]
    async fn missing_beneficiary_blocks_the_whole_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 10_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let cart = now_bin(&ctx, user.uuid).await?;
        let eligible = add_membership(&ctx, cart.uuid, adult.uuid, Some(contact.uuid)).await?;
        let orphan = add_membership(&ctx, cart.uuid, adult.uuid, None).await?;

        let preparation = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;

        assert!(!preparation.ready);
        assert_eq!(preparation.amount_to_charge, money(0, USD));

        let processed: Vec<_> = preparation
            .processing_cart
            .items
            .iter()
            .map(|item| (item.uuid, item.holdable.is_some()))
            .collect();

        assert_eq!(processed, vec![(eligible.uuid, true)]);

        let failed = preparation
            .outcomes
            .iter()
            .find(|(item, _)| *item == orphan.uuid)
            .map(|(_, outcome)| outcome.is_held());

        assert_eq!(failed, Some(false));

        let left_behind = ctx.carts.get_cart(cart.uuid).await?;

        assert_eq!(
            left_behind.items.iter().map(|item| item.uuid).collect::<Vec<_>>(),
            vec![orphan.uuid]
        );

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_never_ready() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        let preparation = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;

        assert!(!preparation.ready);
        assert_eq!(preparation.amount_to_charge, money(0, USD));
        assert!(preparation.outcomes.is_empty());
        assert_eq!(preparation.processing_cart.uuid, cart.uuid);
        assert_eq!(preparation.processing_cart.status, CartStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn preparing_the_same_cart_twice_reuses_its_processing_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        add_membership(&ctx, cart.uuid, adult.uuid, Some(contact.uuid)).await?;

        let first = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;
        let second = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;

        assert!(first.ready && second.ready);
        assert_eq!(second.amount_to_charge, first.amount_to_charge);
        assert_eq!(second.processing_cart.uuid, first.processing_cart.uuid);
        assert_eq!(
            second
                .outcomes
                .iter()
                .map(|(_, outcome)| outcome)
                .collect::<Vec<_>>(),
            vec![&StepOutcome::AlreadyHeld]
        );

        let reservations = |preparation: &Preparation| {
            preparation
                .processing_cart
                .items
                .iter()
                .filter_map(|item| item.reservation())
                .collect::<Vec<_>>()
        };

        assert_eq!(reservations(&second), reservations(&first));
        assert_eq!(reservations(&first).len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn closed_or_settled_carts_cannot_be_prepared() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let paid = create_cart(&ctx, user.uuid, CartStatus::Paid).await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        add_membership(&ctx, paid.uuid, adult.uuid, Some(contact.uuid)).await?;
        add_membership(&ctx, cart.uuid, adult.uuid, Some(contact.uuid)).await?;

        let processing = ctx
            .checkout
            .prepare_cart_for_payment(cart.uuid)
            .await?
            .processing_cart
            .uuid;

        ctx.checkout.after_payment_housekeeping(processing).await?;

        let settled = ctx.checkout.prepare_cart_for_payment(paid.uuid).await;
        let closed = ctx.checkout.prepare_cart_for_payment(processing).await;

        assert!(
            matches!(settled, Err(CheckoutServiceError::InconsistentCartState)),
            "expected InconsistentCartState, got {settled:?}"
        );
        assert!(
            matches!(closed, Err(CheckoutServiceError::InconsistentCartState)),
            "expected InconsistentCartState, got {closed:?}"
        );
        assert_eq!(ctx.carts.get_cart(paid.uuid).await?.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn preparing_twice_claims_nothing_new() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        add_membership(&ctx, cart.uuid, adult.uuid, Some(contact.uuid)).await?;
        add_membership(&ctx, cart.uuid, adult.uuid, Some(contact.uuid)).await?;

        let first = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;
        let second = ctx
            .checkout
            .prepare_cart_for_payment(first.processing_cart.uuid)
            .await?;

        let reservations = |preparation: &Preparation| {
            preparation
                .processing_cart
                .items
                .iter()
                .filter_map(|item| item.reservation())
                .collect::<Vec<_>>()
        };

        assert!(first.ready && second.ready);
        assert_eq!(first.amount_to_charge, second.amount_to_charge);
        assert_eq!(first.amount_to_charge, money(74_000, USD));
        assert_eq!(second.processing_cart.uuid, first.processing_cart.uuid);
        assert_eq!(reservations(&first), reservations(&second));
        assert!(
            second
                .outcomes
                .iter()
                .all(|(_, outcome)| *outcome == StepOutcome::AlreadyHeld)
        );

        Ok(())
    }

    #[tokio::test]
    async fn amount_to_charge_accounts_for_earlier_payments() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let child = create_membership(&ctx, "Child", 10_000).await?;
        let ada = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let byron = create_contact(&ctx, user.uuid, "Byron", "Lovelace").await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        let paid_towards = add_membership(&ctx, cart.uuid, adult.uuid, Some(ada.uuid)).await?;
        add_membership(&ctx, cart.uuid, child.uuid, Some(byron.uuid)).await?;

        let reservation = ctx
            .reservations
            .claim_reservation(paid_towards.uuid, user.uuid)
            .await?;

        record_payment(&ctx, user.uuid, Buyable::Reservation(reservation.uuid), 5_000).await?;

        let preparation = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;

        assert!(preparation.ready);
        assert_eq!(preparation.amount_to_charge, money(37_000 + 10_000 - 5_000, USD));

        Ok(())
    }

    #[tokio::test]
    async fn chassis_now_bin_becomes_the_processing_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let original = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        add_membership(&ctx, original, adult.uuid, Some(contact.uuid)).await?;

        let preparation = ctx.checkout.prepare_chassis_for_payment(&mut chassis).await?;
        let fresh = chassis.now_bin().ok_or("no fresh now bin")?;

        assert!(preparation.ready);
        assert_eq!(preparation.path, CheckoutPath::Chassis);
        assert_eq!(preparation.amount_to_charge, money(37_000, USD));
        assert_eq!(preparation.processing_cart.uuid, original);
        assert_eq!(preparation.processing_cart.status, CartStatus::Processing);
        assert_eq!(preparation.processing_cart.held_membership_count(), 1);
        assert_ne!(fresh.uuid, original);
        assert_eq!(fresh.status, CartStatus::Pending);
        assert!(fresh.items.is_empty());
        assert_eq!(
            chassis.purchase_bin().map(|cart| cart.uuid),
            Some(original)
        );

        Ok(())
    }

    #[tokio::test]
    async fn chassis_path_leaves_failed_items_for_recovery() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let original = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        let orphan = add_membership(&ctx, original, adult.uuid, None).await?;

        let preparation = ctx.checkout.prepare_chassis_for_payment(&mut chassis).await?;
        let fresh = chassis.now_bin().map(|cart| cart.uuid).ok_or("no fresh now bin")?;

        assert!(!preparation.ready);
        assert_eq!(preparation.processing_cart.items.len(), 1);

        let recovered = ctx
            .checkout
            .recover_failed_processing_items(Some(fresh), user.uuid)
            .await?;
        let fresh = ctx.carts.get_cart(fresh).await?;

        assert_eq!(recovered, 1);
        assert_eq!(
            fresh.items.iter().map(|item| item.uuid).collect::<Vec<_>>(),
            vec![orphan.uuid]
        );

        Ok(())
    }

    #[tokio::test]
    async fn chassis_without_a_now_bin_is_inconsistent() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let mut chassis = CartChassis::new(user.uuid);

        let prepared = ctx.checkout.prepare_chassis_for_payment(&mut chassis).await;
        let cheque = ctx.checkout.wait_for_cheque_housekeeping(&mut chassis).await;

        assert!(
            matches!(prepared, Err(CheckoutServiceError::InconsistentCartState)),
            "expected InconsistentCartState, got {prepared:?}"
        );
        assert!(
            matches!(cheque, Err(CheckoutServiceError::InconsistentCartState)),
            "expected InconsistentCartState, got {cheque:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn recovery_moves_abandoned_items_into_the_new_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let abandoned = create_cart(&ctx, user.uuid, CartStatus::Processing).await?;
        let item = add_membership(&ctx, abandoned.uuid, adult.uuid, None).await?;
        let fresh = now_bin(&ctx, user.uuid).await?;

        let recovered = ctx
            .checkout
            .recover_failed_processing_items(Some(fresh.uuid), user.uuid)
            .await?;

        let fresh = ctx.carts.get_cart(fresh.uuid).await?;
        let abandoned = ctx.carts.get_cart(abandoned.uuid).await?;

        assert_eq!(recovered, 1);
        assert_eq!(
            fresh.items.iter().map(|item| item.uuid).collect::<Vec<_>>(),
            vec![item.uuid]
        );
        assert!(abandoned.items.is_empty());
        assert!(!abandoned.is_active_at(Timestamp::now()));

        Ok(())
    }

    #[tokio::test]
    async fn recovery_converges_on_the_complete_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let complete = create_cart(&ctx, user.uuid, CartStatus::Processing).await?;
        let abandoned = create_cart(&ctx, user.uuid, CartStatus::Processing).await?;

        add_membership(&ctx, complete.uuid, adult.uuid, Some(contact.uuid)).await?;
        add_membership(&ctx, abandoned.uuid, adult.uuid, None).await?;
        add_membership(&ctx, abandoned.uuid, adult.uuid, Some(contact.uuid)).await?;

        let recovered = ctx
            .checkout
            .recover_failed_processing_items(Some(complete.uuid), user.uuid)
            .await?;

        let complete = ctx.carts.get_cart(complete.uuid).await?;
        let abandoned = ctx.carts.get_cart(abandoned.uuid).await?;

        assert_eq!(recovered, 2);
        assert_eq!(complete.items.len(), 3);
        assert!(abandoned.items.is_empty());
        assert!(!abandoned.is_active_at(Timestamp::now()));

        Ok(())
    }

    #[tokio::test]
    async fn recovery_moves_untouched_reservations_but_not_paid_ones() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let untouched_cart = create_cart(&ctx, user.uuid, CartStatus::Processing).await?;
        let paid_cart = create_cart(&ctx, user.uuid, CartStatus::Processing).await?;
        let fresh = now_bin(&ctx, user.uuid).await?;

        let untouched =
            add_membership(&ctx, untouched_cart.uuid, adult.uuid, Some(contact.uuid)).await?;
        let paid = add_membership(&ctx, paid_cart.uuid, adult.uuid, Some(contact.uuid)).await?;

        ctx.reservations
            .claim_reservation(untouched.uuid, user.uuid)
            .await?;
        let reservation = ctx.reservations.claim_reservation(paid.uuid, user.uuid).await?;
        record_payment(&ctx, user.uuid, Buyable::Reservation(reservation.uuid), 37_000).await?;

        let recovered = ctx
            .checkout
            .recover_failed_processing_items(Some(fresh.uuid), user.uuid)
            .await?;

        let paid_cart = ctx.carts.get_cart(paid_cart.uuid).await?;

        assert_eq!(recovered, 1);
        assert_eq!(paid_cart.status, CartStatus::Paid);
        assert!(!paid_cart.is_active_at(Timestamp::now()));
        assert_eq!(paid_cart.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn recovery_keeps_partially_paid_carts_open() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let partial_cart = create_cart(&ctx, user.uuid, CartStatus::Processing).await?;
        let fresh = now_bin(&ctx, user.uuid).await?;
        let item = add_membership(&ctx, partial_cart.uuid, adult.uuid, Some(contact.uuid)).await?;

        let reservation = ctx.reservations.claim_reservation(item.uuid, user.uuid).await?;
        record_payment(&ctx, user.uuid, Buyable::Reservation(reservation.uuid), 10_000).await?;

        let recovered = ctx
            .checkout
            .recover_failed_processing_items(Some(fresh.uuid), user.uuid)
            .await?;

        let partial_cart = ctx.carts.get_cart(partial_cart.uuid).await?;

        assert_eq!(recovered, 0);
        assert_eq!(partial_cart.status, CartStatus::Processing);
        assert!(partial_cart.is_active_at(Timestamp::now()));

        Ok(())
    }

    #[tokio::test]
    async fn free_reservations_retire_their_cart_as_paid() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let infant = create_membership(&ctx, "Infant", 0).await?;
        let contact = create_contact(&ctx, user.uuid, "Baby", "Lovelace").await?;
        let abandoned = create_cart(&ctx, user.uuid, CartStatus::Processing).await?;
        let fresh = now_bin(&ctx, user.uuid).await?;
        let item = add_membership(&ctx, abandoned.uuid, infant.uuid, Some(contact.uuid)).await?;

        ctx.reservations.claim_reservation(item.uuid, user.uuid).await?;

        let recovered = ctx
            .checkout
            .recover_failed_processing_items(Some(fresh.uuid), user.uuid)
            .await?;

        let abandoned = ctx.carts.get_cart(abandoned.uuid).await?;

        assert_eq!(recovered, 0);
        assert_eq!(abandoned.status, CartStatus::Paid);
        assert_eq!(abandoned.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn recovery_without_a_usable_destination_is_unresolvable() -> TestResult {
        let ctx = TestContext::new().await;
        let ada = create_user(&ctx, "ada@example.com").await?;
        let grace = create_user(&ctx, "grace@example.com").await?;
        let graces_cart = now_bin(&ctx, grace.uuid).await?;

        let missing = ctx
            .checkout
            .recover_failed_processing_items(None, ada.uuid)
            .await?;
        let unknown = ctx
            .checkout
            .recover_failed_processing_items(Some(CartUuid::new()), ada.uuid)
            .await?;
        let foreign = ctx
            .checkout
            .recover_failed_processing_items(Some(graces_cart.uuid), ada.uuid)
            .await?;

        assert_eq!(missing, RECOVERY_UNRESOLVABLE);
        assert_eq!(unknown, RECOVERY_UNRESOLVABLE);
        assert_eq!(foreign, RECOVERY_UNRESOLVABLE);

        Ok(())
    }

    #[tokio::test]
    async fn paid_cart_is_closed_as_paid() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let cart = now_bin(&ctx, user.uuid).await?;
        add_membership(&ctx, cart.uuid, adult.uuid, Some(contact.uuid)).await?;

        let preparation = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;
        let processing = preparation.processing_cart.uuid;

        record_payment(&ctx, user.uuid, Buyable::Cart(processing), 37_000).await?;
        ctx.checkout.after_payment_housekeeping(processing).await?;

        let cart = ctx.carts.get_cart(processing).await?;
        let reservation = cart
            .items
            .first()
            .and_then(|item| item.reservation())
            .ok_or("item should hold a reservation")?;

        assert_eq!(cart.status, CartStatus::Paid);
        assert!(!cart.is_active_at(Timestamp::now()));
        assert!(cart.items.iter().all(|item| item.processed));
        assert_eq!(
            ctx.reservations.get_reservation(reservation).await?.state,
            ReservationState::Paid
        );

        Ok(())
    }

    #[tokio::test]
    async fn unpaid_cart_is_closed_without_being_marked_paid() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let cart = now_bin(&ctx, user.uuid).await?;
        add_membership(&ctx, cart.uuid, adult.uuid, Some(contact.uuid)).await?;

        let preparation = ctx.checkout.prepare_cart_for_payment(cart.uuid).await?;
        let processing = preparation.processing_cart.uuid;

        ctx.checkout.after_payment_housekeeping(processing).await?;

        let cart = ctx.carts.get_cart(processing).await?;

        assert_eq!(cart.status, CartStatus::Processing);
        assert!(!cart.is_active_at(Timestamp::now()));

        Ok(())
    }

    #[tokio::test]
    async fn cheque_housekeeping_parks_the_cart_and_sends_a_notice() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let purchase = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;
        let item = add_membership(&ctx, purchase, adult.uuid, Some(contact.uuid)).await?;

        ctx.reservations.claim_reservation(item.uuid, user.uuid).await?;

        let mut notifier = MockNotifier::new();
        let expected_user = user.uuid;

        notifier
            .expect_cart_waiting_for_cheque()
            .withf(move |notice| {
                notice.user == expected_user
                    && notice.email == "ada@example.com"
                    && notice.cart == purchase
                    && notice.item_count == 1
                    && notice.outstanding == money(37_000, USD)
                    && notice.item_descriptions
                        == vec!["Adult membership #100 for Ada Lovelace".to_string()]
                    && notice.from_address == "registration@wellington.test"
                    && notice.reply_to == "help@wellington.test"
            })
            .times(1)
            .returning(|_| Ok(()));

        let checkout = ctx.checkout_with_notifier(Arc::new(notifier));

        checkout.wait_for_cheque_housekeeping(&mut chassis).await?;

        let cart = ctx.carts.get_cart(purchase).await?;

        assert!(chassis.now_bin().is_none());
        assert_eq!(cart.status, CartStatus::AwaitingCheque);
        assert!(!cart.is_active_at(Timestamp::now()));

        Ok(())
    }

    #[tokio::test]
    async fn notice_failures_do_not_undo_cheque_housekeeping() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let purchase = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        let mut notifier = MockNotifier::new();

        notifier
            .expect_cart_waiting_for_cheque()
            .times(1)
            .returning(|_| Err(NotifierError::Delivery("mailbox full".to_string())));

        let checkout = ctx.checkout_with_notifier(Arc::new(notifier));

        checkout.wait_for_cheque_housekeeping(&mut chassis).await?;

        let cart = ctx.carts.get_cart(purchase).await?;

        assert_eq!(cart.status, CartStatus::AwaitingCheque);

        Ok(())
    }

    #[tokio::test]
    async fn cheque_after_chassis_checkout_parks_the_processing_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let original = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        add_membership(&ctx, original, adult.uuid, Some(contact.uuid)).await?;

        let preparation = ctx.checkout.prepare_chassis_for_payment(&mut chassis).await?;

        assert!(preparation.ready);

        let mut chassis = ctx.carts.resolve_chassis(user.uuid, Some(chassis)).await?;
        let fresh = chassis.now_bin().map(|cart| cart.uuid).ok_or("no fresh now bin")?;

        ctx.checkout.wait_for_cheque_housekeeping(&mut chassis).await?;

        let parked = ctx.carts.get_cart(original).await?;

        assert_eq!(parked.status, CartStatus::AwaitingCheque);
        assert!(!parked.is_active_at(Timestamp::now()));
        assert_eq!(chassis.purchase_bin().map(|cart| cart.uuid), Some(fresh));
        assert_eq!(ctx.carts.get_cart(fresh).await?.status, CartStatus::Pending);

        let recovered = ctx
            .checkout
            .recover_failed_processing_items(Some(fresh), user.uuid)
            .await?;

        assert_eq!(recovered, 0);
        assert_eq!(ctx.carts.get_cart(original).await?.items.len(), 1);

        Ok(())
    }
}
