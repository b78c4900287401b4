//! Cart housekeeping after payment or when waiting for a cheque.

use jiff::Timestamp;
use sqlx::{Postgres, Transaction};
use tracing::info;
use wellington::{carts::CartStatus, description::DescribedItem};

use crate::domain::{
    carts::{
        PgCartItemsRepository, PgCartsRepository,
        records::{Benefitable, CartRecord, CartUuid},
    },
    contacts::PgContactsRepository,
    reconciliation::ledgers::{cart_owed_in, reconcile_reservation_state},
    reservations::PgReservationsRepository,
};

/// Marks the cart's items processed and closes it, flipping it to `paid`
/// when nothing is left to pay.
pub(super) async fn after_payment_in(
    tx: &mut Transaction<'_, Postgres>,
    cart: &CartRecord,
    now: Timestamp,
) -> Result<i64, sqlx::Error> {
    let carts = PgCartsRepository::new();

    PgCartItemsRepository::new()
        .mark_processed(tx, cart.uuid)
        .await?;

    carts.close_cart(tx, cart.uuid, now).await?;

    for reservation in cart.items.iter().filter_map(|item| item.reservation()) {
        reconcile_reservation_state(tx, reservation).await?;
    }

    let owed = cart_owed_in(tx, cart.uuid).await?;

    if owed <= 0 {
        carts.update_status(tx, cart.uuid, CartStatus::Paid).await?;
    }

    info!(cart = %cart.uuid, owed_cents = owed, "cart closed after payment");

    Ok(owed)
}

/// Parks the cart as `awaiting_cheque` and closes it.
pub(super) async fn await_cheque_in(
    tx: &mut Transaction<'_, Postgres>,
    cart: CartUuid,
    now: Timestamp,
) -> Result<(), sqlx::Error> {
    let carts = PgCartsRepository::new();

    carts
        .update_status(tx, cart, CartStatus::AwaitingCheque)
        .await?;

    carts.close_cart(tx, cart, now).await?;

    info!(%cart, "cart waiting for cheque");

    Ok(())
}

/// Collects what the description of a cart's contents needs for each item.
pub(super) async fn described_items(
    tx: &mut Transaction<'_, Postgres>,
    cart: &CartRecord,
) -> Result<Vec<DescribedItem>, sqlx::Error> {
    let reservations = PgReservationsRepository::new();
    let contacts = PgContactsRepository::new();

    let mut described = Vec::with_capacity(cart.items.len());

    for item in &cart.items {
        let unique_id = match item.reservation() {
            Some(reservation) => Some(format!(
                "#{}",
                reservations
                    .get_reservation(tx, reservation)
                    .await?
                    .membership_number
            )),
            None => None,
        };

        let beneficiary = match item.benefitable {
            Some(Benefitable::Contact(contact)) => Some(
                contacts
                    .get_contact(tx, contact)
                    .await?
                    .beneficiary_name(),
            ),
            None => None,
        };

        described.push(DescribedItem {
            display_name: item.item_name.clone(),
            kind: item.kind,
            unique_id,
            beneficiary,
        });
    }

    Ok(described)
}
