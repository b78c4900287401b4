use clap::Args;
use uuid::Uuid;
use wellington_app::domain::reservations::records::ReservationUuid;

use crate::cli::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct OwedArgs {
    /// Reservation to reconcile
    #[arg(long)]
    reservation: Uuid,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(args: OwedArgs) -> Result<(), String> {
    let context = args.services.context().await?;
    let reservation = ReservationUuid::from_uuid(args.reservation);

    let record = context
        .reservations
        .get_reservation(reservation)
        .await
        .map_err(|error| format!("failed to load reservation: {error}"))?;

    let owed = context
        .reconciliation
        .amount_owed_for_reservation(reservation)
        .await
        .map_err(|error| format!("failed to reconcile reservation: {error}"))?;

    println!("membership_number: {}", record.membership_number);
    println!("state: {}", record.state);
    println!("owed: {owed}");

    Ok(())
}
