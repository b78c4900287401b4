use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use wellington_app::{
    config::{CheckoutConfig, DatabaseConfig, LoggingConfig, NotificationConfig},
    context::AppContext,
    notifications::LogNotifier,
    observability,
};

mod cart;
mod charge;
mod checkout;
mod db;
mod reservation;

#[derive(Debug, Parser)]
#[command(name = "wellington-app", about = "Wellington registration CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Cart(cart::CartCommand),
    Charge(charge::ChargeCommand),
    Checkout(checkout::CheckoutCommand),
    Reservation(reservation::ReservationCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_logging(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Cart(command) => cart::run(command).await,
            Commands::Charge(command) => charge::run(command).await,
            Commands::Checkout(command) => checkout::run(command).await,
            Commands::Reservation(command) => reservation::run(command).await,
        }
    }
}

/// Settings every command that talks to the services needs.
#[derive(Debug, Args)]
pub(crate) struct ServiceArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    checkout: CheckoutConfig,

    #[command(flatten)]
    notifications: NotificationConfig,
}

impl ServiceArgs {
    pub(crate) async fn context(self) -> Result<AppContext, String> {
        let currency = self
            .checkout
            .currency()
            .map_err(|error| error.to_string())?;

        AppContext::from_database_url(
            &self.database.database_url,
            currency,
            self.notifications,
            Arc::new(LogNotifier),
        )
        .await
        .map_err(|error| format!("failed to build app context: {error}"))
    }
}
