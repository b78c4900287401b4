use clap::Args;
use uuid::Uuid;
use wellington_app::domain::carts::records::CartUuid;

use crate::cli::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct CompleteArgs {
    /// Processing cart a payment attempt finished for
    #[arg(long)]
    cart: Uuid,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(args: CompleteArgs) -> Result<(), String> {
    let context = args.services.context().await?;
    let cart = CartUuid::from_uuid(args.cart);

    context
        .checkout
        .after_payment_housekeeping(cart)
        .await
        .map_err(|error| format!("failed to finish checkout: {error}"))?;

    let record = context
        .carts
        .get_cart(cart)
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?;

    let owed = context
        .reconciliation
        .owed_cents_for_cart(cart)
        .await
        .map_err(|error| format!("failed to reconcile cart: {error}"))?;

    println!("cart: {cart}");
    println!("status: {}", record.status);
    println!("owed_cents: {owed}");

    Ok(())
}
