//! Reservations service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        carts::{
            PgCartItemsRepository,
            records::{CartItemUuid, Holdable},
        },
        reservations::{
            claim::claim_in,
            errors::ReservationsServiceError,
            records::{ClaimRecord, OrderRecord, ReservationRecord, ReservationUuid},
            repository::PgReservationsRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgReservationsService {
    db: Db,
    repository: PgReservationsRepository,
    items_repository: PgCartItemsRepository,
}

impl PgReservationsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReservationsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl ReservationsService for PgReservationsService {
    async fn claim_reservation(
        &self,
        item: CartItemUuid,
        customer: UserUuid,
    ) -> Result<ReservationRecord, ReservationsServiceError> {
        let mut tx = self.db.begin().await?;

        let item = self.items_repository.get_cart_item(&mut tx, item).await?;

        if item.holdable.is_some() {
            return Err(ReservationsServiceError::AlreadyExists);
        }

        let reservation = claim_in(&mut tx, &item, customer, Timestamp::now()).await?;

        self.items_repository
            .attach_holdable(&mut tx, item.uuid, Holdable::Reservation(reservation.uuid))
            .await?;

        tx.commit().await?;

        Ok(reservation)
    }

    async fn get_reservation(
        &self,
        reservation: ReservationUuid,
    ) -> Result<ReservationRecord, ReservationsServiceError> {
        let mut tx = self.db.begin().await?;

        let reservation = self.repository.get_reservation(&mut tx, reservation).await?;

        tx.commit().await?;

        Ok(reservation)
    }

    async fn get_active_order(
        &self,
        reservation: ReservationUuid,
    ) -> Result<OrderRecord, ReservationsServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.repository.get_active_order(&mut tx, reservation).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn get_active_claim(
        &self,
        reservation: ReservationUuid,
    ) -> Result<ClaimRecord, ReservationsServiceError> {
        let mut tx = self.db.begin().await?;

        let claim = self.repository.get_active_claim(&mut tx, reservation).await?;

        tx.commit().await?;

        Ok(claim)
    }
}

#[automock]
#[async_trait]
pub trait ReservationsService: Send + Sync {
    /// Claims a reservation for a single cart item and attaches it to the item.
    async fn claim_reservation(
        &self,
        item: CartItemUuid,
        customer: UserUuid,
    ) -> Result<ReservationRecord, ReservationsServiceError>;

    /// Retrieve a single reservation.
    async fn get_reservation(
        &self,
        reservation: ReservationUuid,
    ) -> Result<ReservationRecord, ReservationsServiceError>;

    /// The order linking the reservation to its membership.
    async fn get_active_order(
        &self,
        reservation: ReservationUuid,
    ) -> Result<OrderRecord, ReservationsServiceError>;

    /// The claim linking the reservation to its holder.
    async fn get_active_claim(
        &self,
        reservation: ReservationUuid,
    ) -> Result<ClaimRecord, ReservationsServiceError>;
}
