//! Ledger loading
//!
//! Reads the rows a balance depends on and hands them to the engine
//! ledgers. Callers pass their own transaction so balances are consistent
//! with whatever they are about to write.

use std::collections::HashMap;

use smallvec::SmallVec;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};
use wellington::{
    charges::ChargeLine,
    ledger::{CartLedger, ItemLedger, ReservationLedger},
    reservations::ReservationState,
};

use crate::domain::{
    carts::{PgCartItemsRepository, records::CartUuid},
    charges::{PgChargesRepository, records::Buyable},
    memberships::PgMembershipsRepository,
    reservations::{PgReservationsRepository, records::ReservationUuid},
};

/// Minor units still owed for a reservation.
pub(crate) async fn reservation_owed_in(
    tx: &mut Transaction<'_, Postgres>,
    reservation: ReservationUuid,
) -> Result<i64, sqlx::Error> {
    let membership = PgMembershipsRepository::new()
        .get_reservation_membership(tx, reservation.into_uuid())
        .await?;

    let charges = PgChargesRepository::new()
        .list_charges(tx, Buyable::Reservation(reservation))
        .await?;

    let holding_carts = PgCartItemsRepository::new()
        .list_holding_carts(tx, reservation)
        .await?;

    let mut related_cart_balances = SmallVec::new();

    for cart in holding_carts {
        related_cart_balances.push(cart_owed_in(tx, cart).await?);
    }

    let ledger = ReservationLedger {
        price_cents: membership.price_cents,
        charges: charges.iter().map(|charge| charge.line()).collect(),
        related_cart_balances,
    };

    let owed = ledger.owed_cents();

    debug!(%reservation, owed_cents = owed, "reconciled reservation");

    Ok(owed)
}

/// Minor units still owed for a cart.
pub(crate) async fn cart_owed_in(
    tx: &mut Transaction<'_, Postgres>,
    cart: CartUuid,
) -> Result<i64, sqlx::Error> {
    let charges = PgChargesRepository::new();

    let items = PgCartItemsRepository::new().get_cart_items(tx, cart).await?;

    let mut reservation_charges: HashMap<ReservationUuid, Vec<ChargeLine>> = HashMap::new();

    for charge in charges.list_cart_reservation_charges(tx, cart).await? {
        if let Buyable::Reservation(reservation) = charge.buyable {
            reservation_charges
                .entry(reservation)
                .or_default()
                .push(charge.line());
        }
    }

    let ledger = CartLedger {
        items: items
            .iter()
            .map(|item| ItemLedger {
                price_cents: item.item_price_cents,
                charges: item
                    .reservation()
                    .and_then(|reservation| reservation_charges.get(&reservation))
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect(),
        charges: charges
            .list_charges(tx, Buyable::Cart(cart))
            .await?
            .iter()
            .map(|charge| charge.line())
            .collect(),
    };

    let owed = ledger.owed_cents();

    debug!(%cart, owed_cents = owed, "reconciled cart");

    Ok(owed)
}

/// Brings a reservation's state in line with its balance and returns the
/// state it ends up in.
pub(crate) async fn reconcile_reservation_state(
    tx: &mut Transaction<'_, Postgres>,
    reservation: ReservationUuid,
) -> Result<ReservationState, sqlx::Error> {
    let reservations = PgReservationsRepository::new();

    let current = reservations.get_reservation(tx, reservation).await?;
    let owed = reservation_owed_in(tx, reservation).await?;
    let next = current.state.reconcile(owed);

    if next != current.state {
        reservations.update_state(tx, reservation, next).await?;

        info!(
            %reservation,
            from = %current.state,
            to = %next,
            owed_cents = owed,
            "reservation state reconciled"
        );
    }

    Ok(next)
}
