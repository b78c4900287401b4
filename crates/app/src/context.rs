//! App Context

use std::sync::Arc;

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    config::NotificationConfig,
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        charges::{ChargesService, PgChargesService},
        checkout::{CheckoutService, PgCheckoutService},
        reconciliation::{PgReconciliationService, ReconciliationService},
        reservations::{PgReservationsService, ReservationsService},
        users::{PgUsersService, UsersService},
    },
    notifications::Notifier,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UsersService>,
    pub carts: Arc<dyn CartsService>,
    pub reservations: Arc<dyn ReservationsService>,
    pub charges: Arc<dyn ChargesService>,
    pub reconciliation: Arc<dyn ReconciliationService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        currency: &'static Currency,
        notifications: NotificationConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(
            &Db::new(pool),
            currency,
            notifications,
            notifier,
        ))
    }

    /// Wire every service to one database handle.
    #[must_use]
    pub fn from_db(
        db: &Db,
        currency: &'static Currency,
        notifications: NotificationConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            users: Arc::new(PgUsersService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            reservations: Arc::new(PgReservationsService::new(db.clone())),
            charges: Arc::new(PgChargesService::new(db.clone())),
            reconciliation: Arc::new(PgReconciliationService::new(db.clone(), currency)),
            checkout: Arc::new(PgCheckoutService::new(
                db.clone(),
                currency,
                notifications,
                notifier,
            )),
        }
    }
}
