//! Reservation claim
//!
//! Turns one cart item into a reservation held by a customer. Runs in its
//! own savepoint so a failed claim leaves the caller's transaction intact.

use jiff::Timestamp;
use sqlx::{Postgres, Transaction};
use tracing::info;
use wellington::reservations::{ReservationState, next_membership_number};

use crate::{
    database::savepoint,
    domain::{
        carts::records::{Acquirable, Benefitable, CartItemRecord},
        contacts::PgContactsRepository,
        memberships::PgMembershipsRepository,
        reservations::{
            errors::ReservationsServiceError,
            records::{ReservationRecord, ReservationUuid},
            repository::PgReservationsRepository,
        },
        users::records::UserUuid,
    },
};

/// Claims a reservation for `item` on behalf of `customer`.
///
/// The reservation gets the next membership number, an active order for the
/// item's membership and an active claim for the customer. The item's
/// beneficiary is linked to the new claim.
pub(crate) async fn claim_in(
    tx: &mut Transaction<'_, Postgres>,
    item: &CartItemRecord,
    customer: UserUuid,
    now: Timestamp,
) -> Result<ReservationRecord, ReservationsServiceError> {
    let Acquirable::Membership(membership) = item.acquirable else {
        return Err(ReservationsServiceError::NotClaimable);
    };

    if !item.is_ready_for_payment() {
        return Err(ReservationsServiceError::NotEligible);
    }

    let Some(Benefitable::Contact(contact)) = item.benefitable else {
        return Err(ReservationsServiceError::NotEligible);
    };

    let reservations = PgReservationsRepository::new();
    let mut sp = savepoint(tx).await?;

    let membership = PgMembershipsRepository::new()
        .get_membership(&mut sp, membership)
        .await
        .map_err(|error| match error {
            sqlx::Error::RowNotFound => ReservationsServiceError::InvalidReference,
            other => other.into(),
        })?;

    reservations.lock_numbering(&mut sp).await?;

    let number = next_membership_number(reservations.max_membership_number(&mut sp).await?);

    let reservation = reservations
        .create_reservation(
            &mut sp,
            ReservationUuid::new(),
            number,
            ReservationState::initial(membership.price_cents),
        )
        .await?;

    reservations
        .create_order(&mut sp, reservation.uuid, membership.uuid, now)
        .await?;

    let claim = reservations
        .create_claim(&mut sp, reservation.uuid, customer, now)
        .await?;

    let linked = PgContactsRepository::new()
        .link_claim(&mut sp, contact, claim.uuid)
        .await?;

    if linked == 0 {
        return Err(ReservationsServiceError::InvalidReference);
    }

    sp.commit().await?;

    info!(
        reservation = %reservation.uuid,
        membership_number = reservation.membership_number,
        item = %item.uuid,
        %customer,
        "claimed reservation"
    );

    Ok(reservation)
}
