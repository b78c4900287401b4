//! Reconciliation service.

use async_trait::async_trait;
use mockall::automock;
use rusty_money::{Money, iso::Currency};
use wellington::ledger::money;

use crate::{
    database::Db,
    domain::{
        carts::{PgCartsRepository, records::CartUuid},
        reconciliation::{
            errors::ReconciliationServiceError,
            ledgers::{cart_owed_in, reservation_owed_in},
        },
        reservations::records::ReservationUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgReconciliationService {
    db: Db,
    currency: &'static Currency,
}

impl PgReconciliationService {
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency) -> Self {
        Self { db, currency }
    }
}

#[async_trait]
impl ReconciliationService for PgReconciliationService {
    async fn amount_owed_for_reservation(
        &self,
        reservation: ReservationUuid,
    ) -> Result<Money<'static, Currency>, ReconciliationServiceError> {
        let mut tx = self.db.begin().await?;

        let owed = reservation_owed_in(&mut tx, reservation).await?;

        tx.commit().await?;

        Ok(money(owed, self.currency))
    }

    async fn owed_cents_for_cart(&self, cart: CartUuid) -> Result<i64, ReconciliationServiceError> {
        let mut tx = self.db.begin().await?;

        PgCartsRepository::new().get_cart(&mut tx, cart).await?;

        let owed = cart_owed_in(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(owed)
    }
}

#[automock]
#[async_trait]
pub trait ReconciliationService: Send + Sync {
    /// What is still owed for a reservation, in the configured currency.
    async fn amount_owed_for_reservation(
        &self,
        reservation: ReservationUuid,
    ) -> Result<Money<'static, Currency>, ReconciliationServiceError>;

    /// Minor units still owed for a cart. Negative when the cart was overpaid.
    async fn owed_cents_for_cart(&self, cart: CartUuid) -> Result<i64, ReconciliationServiceError>;
}
