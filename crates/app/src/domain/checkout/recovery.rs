//! Failed checkout recovery

use jiff::Timestamp;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};
use wellington::{
    carts::CartStatus,
    recovery::{HeldReservation, RECOVERY_UNRESOLVABLE, Retirement, SweptItem},
};

use crate::domain::{
    carts::{
        PgCartItemsRepository, PgCartsRepository,
        records::{CartItemRecord, CartUuid},
    },
    memberships::PgMembershipsRepository,
    reconciliation::ledgers::reservation_owed_in,
    reservations::PgReservationsRepository,
    users::records::UserUuid,
};

/// Moves unprocessed items out of the user's abandoned processing carts into
/// `destination` and retires the carts they leave behind.
///
/// Returns how many items moved, or [`RECOVERY_UNRESOLVABLE`] when
/// `destination` is missing, inactive or not the user's.
pub(super) async fn recover_in(
    tx: &mut Transaction<'_, Postgres>,
    destination: Option<CartUuid>,
    user: UserUuid,
    now: Timestamp,
) -> Result<i64, sqlx::Error> {
    let carts = PgCartsRepository::new();
    let items = PgCartItemsRepository::new();

    let destination = match destination {
        Some(cart) => carts.find_cart(tx, cart).await?,
        None => None,
    };

    let Some(destination) = destination
        .filter(|cart| cart.user_uuid == user && cart.is_active_at(now))
    else {
        warn!(%user, "no active cart to recover failed items into");

        return Ok(RECOVERY_UNRESOLVABLE);
    };

    let later = destination.status == CartStatus::ForLater;
    let mut moved = 0_i64;

    for cart in carts
        .list_active_carts(tx, user, CartStatus::Processing, now)
        .await?
    {
        if cart.uuid == destination.uuid {
            continue;
        }

        let mut remaining = Vec::new();

        for item in items.get_cart_items(tx, cart.uuid).await? {
            let swept = sweep(tx, &item).await?;

            if swept.is_unprocessed() {
                items
                    .move_item(tx, item.uuid, destination.uuid, later)
                    .await?;

                moved += 1;
            } else {
                remaining.push(swept);
            }
        }

        let retirement = Retirement::for_remaining(&remaining);

        match retirement {
            Retirement::Close => {
                carts.close_cart(tx, cart.uuid, now).await?;
            }
            Retirement::MarkPaid => {
                carts.update_status(tx, cart.uuid, CartStatus::Paid).await?;
                carts.close_cart(tx, cart.uuid, now).await?;
            }
            Retirement::KeepOpen => {}
        }

        info!(cart = %cart.uuid, ?retirement, "swept processing cart");
    }

    if moved > 0 {
        info!(%user, destination = %destination.uuid, moved, "recovered failed checkout items");
    }

    Ok(moved)
}

async fn sweep(
    tx: &mut Transaction<'_, Postgres>,
    item: &CartItemRecord,
) -> Result<SweptItem, sqlx::Error> {
    let reservation = match item.reservation() {
        Some(reservation) => {
            let state = PgReservationsRepository::new()
                .get_reservation(tx, reservation)
                .await?
                .state;

            let price_cents = PgMembershipsRepository::new()
                .get_reservation_membership(tx, reservation.into_uuid())
                .await?
                .price_cents;

            Some(HeldReservation {
                state,
                price_cents,
                owed_cents: reservation_owed_in(tx, reservation).await?,
            })
        }
        None => None,
    };

    Ok(SweptItem {
        kind: item.kind,
        reservation,
    })
}
