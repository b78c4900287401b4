//! Bin resolution
//!
//! Finding or creating the carts that back a user's chassis. Shared by the
//! carts service and checkout, which needs a fresh now-bin after it turns the
//! old one into a processing cart.

use jiff::Timestamp;
use sqlx::{Postgres, Transaction};
use tracing::{debug, warn};
use wellington::carts::CartStatus;

use crate::{
    database::savepoint,
    domain::{
        carts::{
            errors::{CartsServiceError, is_unique_violation},
            records::{CartRecord, CartUuid},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        users::records::UserUuid,
    },
};

/// A cart with its items.
pub(crate) async fn load_cart(
    tx: &mut Transaction<'_, Postgres>,
    cart: CartUuid,
) -> Result<CartRecord, sqlx::Error> {
    let mut record = PgCartsRepository::new().get_cart(tx, cart).await?;

    record.items = PgCartItemsRepository::new().get_cart_items(tx, cart).await?;

    Ok(record)
}

pub(crate) async fn find_loaded_cart(
    tx: &mut Transaction<'_, Postgres>,
    cart: CartUuid,
) -> Result<Option<CartRecord>, sqlx::Error> {
    let Some(mut record) = PgCartsRepository::new().find_cart(tx, cart).await? else {
        return Ok(None);
    };

    record.items = PgCartItemsRepository::new().get_cart_items(tx, cart).await?;

    Ok(Some(record))
}

/// Resolves the user's active cart with `status`.
///
/// The `held` cart is reused while it is still active. Otherwise the store is
/// searched, and failing that a cart is created. If another request creates
/// the cart first the lookup is retried once.
pub(crate) async fn resolve_bin(
    tx: &mut Transaction<'_, Postgres>,
    user: UserUuid,
    held: Option<&CartRecord>,
    status: CartStatus,
    now: Timestamp,
) -> Result<CartRecord, CartsServiceError> {
    let carts = PgCartsRepository::new();

    if let Some(held) = held
        && let Some(current) = find_loaded_cart(tx, held.uuid).await?
        && current.user_uuid == user
        && current.status == status
        && current.is_active_at(now)
    {
        return Ok(current);
    }

    if let Some(found) = carts.find_active_cart(tx, user, status, now).await? {
        return Ok(load_cart(tx, found.uuid).await?);
    }

    let mut sp = savepoint(tx).await?;

    match carts
        .create_cart(&mut sp, CartUuid::new(), user, status, now)
        .await
    {
        Ok(created) => {
            sp.commit().await?;

            debug!(cart = %created.uuid, %user, %status, "created cart");

            return Ok(created);
        }
        Err(error) if is_unique_violation(&error) => {
            sp.rollback().await?;

            warn!(%user, %status, "cart created concurrently, retrying lookup");
        }
        Err(error) => return Err(error.into()),
    }

    match carts.find_active_cart(tx, user, status, now).await? {
        Some(found) => Ok(load_cart(tx, found.uuid).await?),
        None => Err(CartsServiceError::InconsistentCartState),
    }
}
