//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;
use wellington::carts::CartStatus;

use crate::{
    database::Db,
    domain::{
        carts::{
            chassis::CartChassis,
            data::{NewCart, NewCartItem},
            errors::CartsServiceError,
            records::{Acquirable, CartItemRecord, CartItemUuid, CartRecord, CartUuid},
            repositories::{CartItemInsert, PgCartItemsRepository, PgCartsRepository},
            resolution::{find_loaded_cart, load_cart, resolve_bin},
        },
        memberships::PgMembershipsRepository,
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    memberships_repository: PgMembershipsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            memberships_repository: PgMembershipsRepository::new(),
        }
    }

    /// Resolves both bins inside `tx`, reusing the chassis's references where possible.
    async fn resolve_bins(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        chassis: &CartChassis,
        now: Timestamp,
    ) -> Result<(CartRecord, CartRecord), CartsServiceError> {
        let now_bin = resolve_bin(
            tx,
            chassis.user(),
            chassis.now_bin(),
            CartStatus::Pending,
            now,
        )
        .await?;

        let later_bin = resolve_bin(
            tx,
            chassis.user(),
            chassis.later_bin(),
            CartStatus::ForLater,
            now,
        )
        .await?;

        Ok((now_bin, later_bin))
    }

    /// Moves one item between the bins of a chassis.
    async fn move_item(
        &self,
        chassis: &mut CartChassis,
        item: CartItemUuid,
        to_later: bool,
    ) -> Result<(), CartsServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let (now_bin, later_bin) = self.resolve_bins(&mut tx, chassis, now).await?;
        let (source, destination) = if to_later {
            (&now_bin, &later_bin)
        } else {
            (&later_bin, &now_bin)
        };

        let record = self.items_repository.get_cart_item(&mut tx, item).await?;

        if record.cart_uuid == source.uuid {
            self.items_repository
                .move_item(&mut tx, item, destination.uuid, to_later)
                .await?;
        } else if record.cart_uuid != destination.uuid {
            return Err(CartsServiceError::ItemNotInChassis);
        }

        let now_bin = load_cart(&mut tx, now_bin.uuid).await?;
        let later_bin = load_cart(&mut tx, later_bin.uuid).await?;

        tx.commit().await?;

        chassis.set_now_bin(Some(now_bin));
        chassis.set_later_bin(Some(later_bin));

        Ok(())
    }

    async fn move_all(
        &self,
        chassis: &mut CartChassis,
        to_later: bool,
    ) -> Result<(), CartsServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let (now_bin, later_bin) = self.resolve_bins(&mut tx, chassis, now).await?;
        let (source, destination) = if to_later {
            (now_bin.uuid, later_bin.uuid)
        } else {
            (later_bin.uuid, now_bin.uuid)
        };

        let moved = self
            .items_repository
            .move_all_items(&mut tx, source, destination, to_later)
            .await?;

        let now_bin = load_cart(&mut tx, now_bin.uuid).await?;
        let later_bin = load_cart(&mut tx, later_bin.uuid).await?;

        tx.commit().await?;

        info!(user = %chassis.user(), moved, to_later, "moved cart items");

        chassis.set_now_bin(Some(now_bin));
        chassis.set_later_bin(Some(later_bin));

        Ok(())
    }

    /// Deletes unclaimed items from one bin and reports whether it is empty.
    async fn destroy(
        &self,
        chassis: &mut CartChassis,
        later: bool,
    ) -> Result<bool, CartsServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let (held, status) = if later {
            (chassis.later_bin(), CartStatus::ForLater)
        } else {
            (chassis.now_bin(), CartStatus::Pending)
        };

        let bin = resolve_bin(&mut tx, chassis.user(), held, status, now).await?;

        let deleted = self
            .items_repository
            .delete_unheld_items(&mut tx, bin.uuid)
            .await?;

        let bin = load_cart(&mut tx, bin.uuid).await?;

        tx.commit().await?;

        info!(cart = %bin.uuid, deleted, "emptied cart");

        let empty = bin.items.is_empty();

        if later {
            chassis.set_later_bin(Some(bin));
        } else {
            chassis.set_now_bin(Some(bin));
        }

        Ok(empty)
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn create_cart(&self, cart: NewCart) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .carts_repository
            .create_cart(&mut tx, cart.uuid, cart.user_uuid, cart.status, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_cart(&self, cart: CartUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn add_item(
        &self,
        cart: CartUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let target = self.carts_repository.get_cart(&mut tx, cart).await?;

        let (item_name, item_price_cents) = match item.acquirable {
            Acquirable::Membership(membership) => {
                let membership = self
                    .memberships_repository
                    .get_membership(&mut tx, membership)
                    .await
                    .map_err(|error| match error {
                        sqlx::Error::RowNotFound => CartsServiceError::InvalidReference,
                        other => other.into(),
                    })?;

                if !membership.is_active_at(now) {
                    return Err(CartsServiceError::Unavailable);
                }

                (membership.name, membership.price_cents)
            }
            Acquirable::Donation => {
                if item.donation_cents <= 0 {
                    return Err(CartsServiceError::InvalidData);
                }

                ("Donation".to_string(), item.donation_cents)
            }
        };

        let created = self
            .items_repository
            .create_cart_item(
                &mut tx,
                CartItemInsert {
                    uuid: item.uuid,
                    cart,
                    acquirable: item.acquirable,
                    benefitable: item.benefitable,
                    item_name,
                    item_price_cents,
                    later: target.status == CartStatus::ForLater,
                    available: true,
                },
            )
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn resolve_chassis(
        &self,
        user: UserUuid,
        existing: Option<CartChassis>,
    ) -> Result<CartChassis, CartsServiceError> {
        let chassis = existing
            .filter(|chassis| chassis.user() == user)
            .unwrap_or_else(|| CartChassis::new(user));

        let mut tx = self.db.begin().await?;

        let now = Timestamp::now();

        let (now_bin, later_bin) = self.resolve_bins(&mut tx, &chassis, now).await?;

        let prepared = match chassis.prepared_bin() {
            Some(prepared) => find_loaded_cart(&mut tx, prepared.uuid)
                .await?
                .filter(|cart| {
                    cart.user_uuid == user
                        && cart.status == CartStatus::Processing
                        && cart.is_active_at(now)
                }),
            None => None,
        };

        tx.commit().await?;

        let mut resolved = CartChassis::with_bins(user, now_bin, later_bin);

        resolved.set_purchase_bin(prepared);

        Ok(resolved)
    }

    async fn move_all_to_later(&self, chassis: &mut CartChassis) -> Result<(), CartsServiceError> {
        self.move_all(chassis, true).await
    }

    async fn move_all_to_now(&self, chassis: &mut CartChassis) -> Result<(), CartsServiceError> {
        self.move_all(chassis, false).await
    }

    async fn move_item_to_later(
        &self,
        chassis: &mut CartChassis,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        self.move_item(chassis, item, true).await
    }

    async fn move_item_to_now(
        &self,
        chassis: &mut CartChassis,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        self.move_item(chassis, item, false).await
    }

    async fn destroy_now(&self, chassis: &mut CartChassis) -> Result<bool, CartsServiceError> {
        self.destroy(chassis, false).await
    }

    async fn destroy_later(&self, chassis: &mut CartChassis) -> Result<bool, CartsServiceError> {
        self.destroy(chassis, true).await
    }

    async fn verify_availability(
        &self,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, CartsServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let items = self.items_repository.get_cart_items(&mut tx, cart).await?;
        let mut problems = Vec::new();

        for mut item in items {
            let Acquirable::Membership(membership) = item.acquirable else {
                continue;
            };

            let membership = self
                .memberships_repository
                .get_membership(&mut tx, membership)
                .await?;

            let available = membership.is_active_at(now)
                && membership.name == item.item_name
                && membership.price_cents == item.item_price_cents;

            if available != item.available {
                self.items_repository
                    .set_available(&mut tx, item.uuid, available)
                    .await?;

                item.available = available;
            }

            if !available {
                problems.push(item);
            }
        }

        tx.commit().await?;

        Ok(problems)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Creates a new cart with the given details.
    async fn create_cart(&self, cart: NewCart) -> Result<CartRecord, CartsServiceError>;

    /// Retrieve a single cart with its items.
    async fn get_cart(&self, cart: CartUuid) -> Result<CartRecord, CartsServiceError>;

    /// Adds an item to the cart, snapshotting the membership's name and price.
    async fn add_item(
        &self,
        cart: CartUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Removes an item from the cart.
    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError>;

    /// Resolves the user's now and later bins, creating them when missing.
    async fn resolve_chassis(
        &self,
        user: UserUuid,
        existing: Option<CartChassis>,
    ) -> Result<CartChassis, CartsServiceError>;

    async fn move_all_to_later(&self, chassis: &mut CartChassis) -> Result<(), CartsServiceError>;

    async fn move_all_to_now(&self, chassis: &mut CartChassis) -> Result<(), CartsServiceError>;

    /// Saves one item from the now-bin for later.
    async fn move_item_to_later(
        &self,
        chassis: &mut CartChassis,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError>;

    /// Brings one saved item back into the now-bin.
    async fn move_item_to_now(
        &self,
        chassis: &mut CartChassis,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError>;

    /// Deletes the now-bin's unclaimed items, returning whether it is empty.
    async fn destroy_now(&self, chassis: &mut CartChassis) -> Result<bool, CartsServiceError>;

    /// Deletes the later-bin's unclaimed items, returning whether it is empty.
    async fn destroy_later(&self, chassis: &mut CartChassis) -> Result<bool, CartsServiceError>;

    /// Re-checks every membership item against the catalogue and returns the
    /// items that can no longer be bought as snapshotted.
    async fn verify_availability(
        &self,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{
        domain::{
            checkout::CheckoutService,
            memberships::{MembershipsService, data::NewMembership, records::MembershipUuid},
            reservations::ReservationsService,
        },
        test::{
            TestContext,
            helpers::{add_membership, create_contact, create_membership, create_user, now_bin},
        },
    };

    use super::*;

    #[tokio::test]
    async fn add_item_snapshots_membership_name_and_price() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        let item = add_membership(&ctx, cart.uuid, adult.uuid, None).await?;

        assert_eq!(item.item_name, "Adult");
        assert_eq!(item.item_price_cents, 37_000);
        assert_eq!(item.acquirable, Acquirable::Membership(adult.uuid));
        assert!(item.available);
        assert!(!item.later);

        let cart = ctx.carts.get_cart(cart.uuid).await?;

        assert_eq!(cart.items, vec![item]);

        Ok(())
    }

    #[tokio::test]
    async fn items_added_to_the_later_bin_are_flagged_later() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let later = chassis.later_bin().map(|cart| cart.uuid).ok_or("no later bin")?;

        let item = add_membership(&ctx, later, adult.uuid, None).await?;

        assert!(item.later);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_membership_is_an_invalid_reference() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        let result = add_membership(&ctx, cart.uuid, MembershipUuid::new(), None).await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn memberships_off_sale_are_unavailable() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        let retired = ctx
            .memberships
            .create_membership(NewMembership {
                uuid: MembershipUuid::new(),
                name: "Early bird".to_string(),
                price_cents: 25_000,
                active_from: Timestamp::UNIX_EPOCH,
                active_to: Some(Timestamp::from_second(86_400)?),
            })
            .await?;

        let result = add_membership(&ctx, cart.uuid, retired.uuid, None).await;

        assert!(
            matches!(result, Err(CartsServiceError::Unavailable)),
            "expected Unavailable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn donations_need_a_positive_amount() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        let donation = ctx
            .carts
            .add_item(cart.uuid, NewCartItem::donation(2_500))
            .await?;
        let result = ctx.carts.add_item(cart.uuid, NewCartItem::donation(0)).await;

        assert_eq!(donation.item_name, "Donation");
        assert_eq!(donation.item_price_cents, 2_500);
        assert!(
            matches!(result, Err(CartsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_deletes_it() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let cart = now_bin(&ctx, user.uuid).await?;
        let item = add_membership(&ctx, cart.uuid, adult.uuid, None).await?;

        ctx.carts.remove_item(cart.uuid, item.uuid).await?;
        let again = ctx.carts.remove_item(cart.uuid, item.uuid).await;

        assert!(ctx.carts.get_cart(cart.uuid).await?.items.is_empty());
        assert!(
            matches!(again, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn resolve_chassis_creates_bins_once() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;

        let first = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let second = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let reused = ctx
            .carts
            .resolve_chassis(user.uuid, Some(first.clone()))
            .await?;

        let now_bin = first.now_bin().ok_or("no now bin")?;
        let later_bin = first.later_bin().ok_or("no later bin")?;

        assert_eq!(now_bin.status, CartStatus::Pending);
        assert_eq!(later_bin.status, CartStatus::ForLater);
        assert_eq!(second.now_bin().map(|cart| cart.uuid), Some(now_bin.uuid));
        assert_eq!(second.later_bin().map(|cart| cart.uuid), Some(later_bin.uuid));
        assert_eq!(reused.now_bin().map(|cart| cart.uuid), Some(now_bin.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn resolve_chassis_replaces_a_closed_now_bin() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let original = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        ctx.checkout.wait_for_cheque_housekeeping(&mut chassis).await?;
        let chassis = ctx.carts.resolve_chassis(user.uuid, Some(chassis)).await?;

        let replacement = chassis.now_bin().ok_or("no now bin")?;

        assert_ne!(replacement.uuid, original);
        assert_eq!(replacement.status, CartStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn move_all_between_bins() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let now = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        add_membership(&ctx, now, adult.uuid, None).await?;
        add_membership(&ctx, now, adult.uuid, None).await?;

        ctx.carts.move_all_to_later(&mut chassis).await?;

        assert_eq!(chassis.now_count(), 0);
        assert_eq!(chassis.later_count(), 2);
        assert!(chassis.later_items().iter().all(|item| item.later));

        ctx.carts.move_all_to_now(&mut chassis).await?;

        assert_eq!(chassis.now_count(), 2);
        assert_eq!(chassis.later_count(), 0);
        assert_eq!(chassis.all_count(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn move_single_items_between_bins() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let now = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        let saved = add_membership(&ctx, now, adult.uuid, None).await?;
        add_membership(&ctx, now, adult.uuid, None).await?;

        ctx.carts.move_item_to_later(&mut chassis, saved.uuid).await?;

        assert_eq!(chassis.now_count(), 1);
        assert_eq!(
            chassis.later_items().first().map(|item| item.uuid),
            Some(saved.uuid)
        );

        ctx.carts.move_item_to_now(&mut chassis, saved.uuid).await?;

        assert_eq!(chassis.now_count(), 2);
        assert_eq!(chassis.later_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn moving_a_foreign_item_is_refused() -> TestResult {
        let ctx = TestContext::new().await;
        let ada = create_user(&ctx, "ada@example.com").await?;
        let grace = create_user(&ctx, "grace@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let mut chassis = ctx.carts.resolve_chassis(ada.uuid, None).await?;
        let elsewhere = now_bin(&ctx, grace.uuid).await?;
        let foreign = add_membership(&ctx, elsewhere.uuid, adult.uuid, None).await?;

        let result = ctx.carts.move_item_to_later(&mut chassis, foreign.uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::ItemNotInChassis)),
            "expected ItemNotInChassis, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn destroy_now_keeps_claimed_items() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let now = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        let claimed = add_membership(&ctx, now, adult.uuid, Some(contact.uuid)).await?;
        add_membership(&ctx, now, adult.uuid, None).await?;
        ctx.reservations
            .claim_reservation(claimed.uuid, user.uuid)
            .await?;

        let empty = ctx.carts.destroy_now(&mut chassis).await?;

        assert!(!empty, "the claimed item should survive");
        assert_eq!(
            chassis.now_items().iter().map(|item| item.uuid).collect::<Vec<_>>(),
            vec![claimed.uuid]
        );

        Ok(())
    }

    #[tokio::test]
    async fn destroy_later_empties_the_later_bin() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let mut chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let later = chassis.later_bin().map(|cart| cart.uuid).ok_or("no later bin")?;

        add_membership(&ctx, later, adult.uuid, None).await?;

        assert!(ctx.carts.destroy_later(&mut chassis).await?);
        assert_eq!(chassis.later_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn chassis_operations_stay_with_their_user() -> TestResult {
        let ctx = TestContext::new().await;
        let ada = create_user(&ctx, "ada@example.com").await?;
        let grace = create_user(&ctx, "grace@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;

        let mut ada_chassis = ctx.carts.resolve_chassis(ada.uuid, None).await?;
        let grace_chassis = ctx.carts.resolve_chassis(grace.uuid, None).await?;
        let grace_now = grace_chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;
        let ada_now = ada_chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        add_membership(&ctx, ada_now, adult.uuid, None).await?;
        add_membership(&ctx, grace_now, adult.uuid, None).await?;

        ctx.carts.move_all_to_later(&mut ada_chassis).await?;
        ctx.carts.destroy_later(&mut ada_chassis).await?;

        let grace_chassis = ctx
            .carts
            .resolve_chassis(grace.uuid, Some(grace_chassis))
            .await?;

        assert_eq!(grace_chassis.now_count(), 1);
        assert_eq!(grace_chassis.later_count(), 0);
        assert_eq!(grace_chassis.now_bin().map(|cart| cart.uuid), Some(grace_now));
        assert_eq!(ada_chassis.all_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn a_chassis_for_someone_else_is_not_reused() -> TestResult {
        let ctx = TestContext::new().await;
        let ada = create_user(&ctx, "ada@example.com").await?;
        let grace = create_user(&ctx, "grace@example.com").await?;

        let ada_chassis = ctx.carts.resolve_chassis(ada.uuid, None).await?;
        let grace_chassis = ctx
            .carts
            .resolve_chassis(grace.uuid, Some(ada_chassis.clone()))
            .await?;

        assert_eq!(grace_chassis.user(), grace.uuid);
        assert_ne!(
            grace_chassis.now_bin().map(|cart| cart.uuid),
            ada_chassis.now_bin().map(|cart| cart.uuid)
        );

        Ok(())
    }

    #[tokio::test]
    async fn can_proceed_once_every_item_has_a_beneficiary() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let contact = create_contact(&ctx, user.uuid, "Ada", "Lovelace").await?;
        let chassis = ctx.carts.resolve_chassis(user.uuid, None).await?;
        let now = chassis.now_bin().map(|cart| cart.uuid).ok_or("no now bin")?;

        assert!(!chassis.can_proceed_to_payment(), "empty carts cannot be paid");

        let item = add_membership(&ctx, now, adult.uuid, None).await?;
        let chassis = ctx.carts.resolve_chassis(user.uuid, Some(chassis)).await?;

        assert!(!chassis.can_proceed_to_payment(), "missing beneficiary");

        ctx.carts.remove_item(now, item.uuid).await?;
        add_membership(&ctx, now, adult.uuid, Some(contact.uuid)).await?;
        let chassis = ctx.carts.resolve_chassis(user.uuid, Some(chassis)).await?;

        assert!(chassis.can_proceed_to_payment());
        assert!(chassis.payment_by_cheque_allowed());

        Ok(())
    }

    #[tokio::test]
    async fn available_items_pass_verification() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "ada@example.com").await?;
        let adult = create_membership(&ctx, "Adult", 37_000).await?;
        let cart = now_bin(&ctx, user.uuid).await?;

        add_membership(&ctx, cart.uuid, adult.uuid, None).await?;
        ctx.carts
            .add_item(cart.uuid, NewCartItem::donation(1_000))
            .await?;

        let problems = ctx.carts.verify_availability(cart.uuid).await?;

        assert!(problems.is_empty());

        Ok(())
    }
}
