//! Charges service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;
use wellington::{
    charges::ChargeState,
    ledger::{LedgerError, validate_payment},
};

use crate::{
    database::Db,
    domain::{
        charges::{
            data::NewCharge,
            errors::ChargesServiceError,
            records::{Buyable, ChargeRecord, ChargeUuid},
            repository::PgChargesRepository,
        },
        reconciliation::ledgers::{cart_owed_in, reconcile_reservation_state, reservation_owed_in},
    },
};

#[derive(Debug, Clone)]
pub struct PgChargesService {
    db: Db,
    repository: PgChargesRepository,
}

impl PgChargesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgChargesRepository::new(),
        }
    }

    async fn owed_for(
        tx: &mut Transaction<'_, Postgres>,
        buyable: Buyable,
    ) -> Result<i64, sqlx::Error> {
        match buyable {
            Buyable::Cart(cart) => cart_owed_in(tx, cart).await,
            Buyable::Reservation(reservation) => reservation_owed_in(tx, reservation).await,
        }
    }
}

#[async_trait]
impl ChargesService for PgChargesService {
    async fn create_charge(&self, charge: NewCharge) -> Result<ChargeRecord, ChargesServiceError> {
        let mut tx = self.db.begin().await?;

        // Site selection deposits are not part of the membership balance.
        if charge.site_selection {
            if charge.amount_cents <= 0 {
                return Err(LedgerError::NonPositiveAmount {
                    amount_cents: charge.amount_cents,
                }
                .into());
            }
        } else {
            let owed = Self::owed_for(&mut tx, charge.buyable).await?;

            validate_payment(charge.amount_cents, owed)?;
        }

        let charge = self.repository.create_charge(&mut tx, charge).await?;

        tx.commit().await?;

        info!(
            charge = %charge.uuid,
            amount_cents = charge.amount_cents,
            transfer = %charge.transfer,
            "charge recorded"
        );

        Ok(charge)
    }

    async fn settle_charge(
        &self,
        charge: ChargeUuid,
        state: ChargeState,
    ) -> Result<ChargeRecord, ChargesServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.get_charge_for_update(&mut tx, charge).await?;

        if state == ChargeState::Pending || !current.state.can_transition_to(state) {
            return Err(ChargesServiceError::InvalidTransition {
                from: current.state,
                to: state,
            });
        }

        let settled = self.repository.update_state(&mut tx, charge, state).await?;

        if let Buyable::Reservation(reservation) = settled.buyable {
            reconcile_reservation_state(&mut tx, reservation).await?;
        }

        tx.commit().await?;

        info!(charge = %settled.uuid, state = %settled.state, "charge settled");

        Ok(settled)
    }

    async fn list_charges(
        &self,
        buyable: Buyable,
    ) -> Result<Vec<ChargeRecord>, ChargesServiceError> {
        let mut tx = self.db.begin().await?;

        let charges = self.repository.list_charges(&mut tx, buyable).await?;

        tx.commit().await?;

        Ok(charges)
    }
}

#[automock]
#[async_trait]
pub trait ChargesService: Send + Sync {
    /// Records a pending charge, refusing amounts above what is owed.
    async fn create_charge(&self, charge: NewCharge) -> Result<ChargeRecord, ChargesServiceError>;

    /// Moves a pending or failed charge to `successful` or `failed`.
    async fn settle_charge(
        &self,
        charge: ChargeUuid,
        state: ChargeState,
    ) -> Result<ChargeRecord, ChargesServiceError>;

    /// Charges recorded against a cart or reservation, oldest first.
    async fn list_charges(
        &self,
        buyable: Buyable,
    ) -> Result<Vec<ChargeRecord>, ChargesServiceError>;
}
