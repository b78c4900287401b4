//! Checkout preparation steps
//!
//! Each membership item is claimed inside its own savepoint. A step that
//! fails is rolled back and recorded, and the remaining items carry on.

use jiff::Timestamp;
use sqlx::{Postgres, Transaction};
use tracing::{debug, warn};
use wellington::checkout::{PreparationTally, StepOutcome};

use crate::{
    database::savepoint,
    domain::{
        carts::{
            PgCartItemsRepository,
            records::{CartItemRecord, CartItemUuid, CartUuid, Holdable},
        },
        reconciliation::ledgers::reservation_owed_in,
        reservations::{
            ReservationsServiceError, claim::claim_in, records::ReservationUuid,
        },
        users::records::UserUuid,
    },
};

/// Tally and per-item outcomes of a run of steps.
#[derive(Debug, Default)]
pub(super) struct StepRun {
    pub tally: PreparationTally,
    pub outcomes: Vec<(CartItemUuid, StepOutcome)>,
}

/// Runs one step per item, adding each held reservation's balance to the tally.
///
/// When `reassign_to` is set, items that end up holding a reservation are
/// moved into that cart.
pub(super) async fn run_steps(
    tx: &mut Transaction<'_, Postgres>,
    items: &[CartItemRecord],
    customer: UserUuid,
    reassign_to: Option<CartUuid>,
    baseline: usize,
    now: Timestamp,
) -> Result<StepRun, sqlx::Error> {
    let mut tally = PreparationTally::new(baseline);
    let mut outcomes = Vec::with_capacity(items.len());

    for item in items {
        let mut sp = savepoint(tx).await?;

        let (outcome, reservation) =
            match step_in(&mut sp, item, customer, reassign_to, now).await {
                Ok((outcome, reservation)) => {
                    sp.commit().await?;

                    (outcome, Some(reservation))
                }
                Err(error) => {
                    sp.rollback().await?;

                    warn!(item = %item.uuid, %error, "checkout step failed");

                    (
                        StepOutcome::Failed {
                            reason: error.to_string(),
                        },
                        None,
                    )
                }
            };

        let owed = match reservation {
            Some(reservation) => reservation_owed_in(tx, reservation).await?,
            None => 0,
        };

        tally.record(&outcome, owed);
        outcomes.push((item.uuid, outcome));
    }

    debug!(
        baseline = tally.baseline(),
        claimed = tally.claimed(),
        held = tally.held(),
        failed = tally.failed(),
        owed_cents = tally.owed_cents(),
        "checkout steps finished"
    );

    Ok(StepRun { tally, outcomes })
}

async fn step_in(
    tx: &mut Transaction<'_, Postgres>,
    item: &CartItemRecord,
    customer: UserUuid,
    reassign_to: Option<CartUuid>,
    now: Timestamp,
) -> Result<(StepOutcome, ReservationUuid), ReservationsServiceError> {
    let items = PgCartItemsRepository::new();

    let (outcome, reservation) = match item.reservation() {
        Some(reservation) => (StepOutcome::AlreadyHeld, reservation),
        None => {
            let reservation = claim_in(tx, item, customer, now).await?;

            items
                .attach_holdable(tx, item.uuid, Holdable::Reservation(reservation.uuid))
                .await?;

            (StepOutcome::Claimed, reservation.uuid)
        }
    };

    if let Some(destination) = reassign_to
        && item.cart_uuid != destination
    {
        items.move_item(tx, item.uuid, destination, false).await?;
    }

    Ok((outcome, reservation))
}
