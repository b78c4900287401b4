use clap::Args;
use uuid::Uuid;
use wellington::charges::Transfer;
use wellington_app::domain::{
    carts::records::CartUuid,
    charges::{
        data::NewCharge,
        records::{Buyable, ChargeUuid},
    },
    reservations::records::ReservationUuid,
    users::records::UserUuid,
};

use crate::cli::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateChargeArgs {
    /// User making the payment
    #[arg(long)]
    user: Uuid,

    /// Cart being paid for
    #[arg(long, conflicts_with = "reservation", required_unless_present = "reservation")]
    cart: Option<Uuid>,

    /// Reservation being paid for
    #[arg(long)]
    reservation: Option<Uuid>,

    /// Amount in minor units
    #[arg(long)]
    amount_cents: i64,

    /// How the money arrived (stripe, cash, cheque, credit)
    #[arg(long, default_value = "stripe")]
    transfer: Transfer,

    /// Record a site selection fee rather than a membership payment
    #[arg(long)]
    site_selection: bool,

    /// Free-text note kept with the charge
    #[arg(long, default_value = "")]
    comment: String,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(args: CreateChargeArgs) -> Result<(), String> {
    let buyable = match (args.cart, args.reservation) {
        (Some(cart), _) => Buyable::Cart(CartUuid::from_uuid(cart)),
        (None, Some(reservation)) => Buyable::Reservation(ReservationUuid::from_uuid(reservation)),
        (None, None) => return Err("either --cart or --reservation is required".to_string()),
    };

    let context = args.services.context().await?;

    let charge = context
        .charges
        .create_charge(NewCharge {
            uuid: ChargeUuid::new(),
            user_uuid: UserUuid::from_uuid(args.user),
            buyable,
            amount_cents: args.amount_cents,
            transfer: args.transfer,
            site_selection: args.site_selection,
            comment: args.comment,
        })
        .await
        .map_err(|error| format!("failed to create charge: {error}"))?;

    println!("charge_uuid: {}", charge.uuid);
    println!("state: {}", charge.state);

    Ok(())
}
