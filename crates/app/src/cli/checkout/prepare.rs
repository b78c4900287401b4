use clap::Args;
use uuid::Uuid;
use wellington_app::domain::users::records::UserUuid;

use crate::cli::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct PrepareArgs {
    /// User checking out
    #[arg(long)]
    user: Uuid,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(args: PrepareArgs) -> Result<(), String> {
    let context = args.services.context().await?;
    let user = UserUuid::from_uuid(args.user);

    let chassis = context
        .carts
        .resolve_chassis(user, None)
        .await
        .map_err(|error| format!("failed to load carts: {error}"))?;

    let recovered = context
        .checkout
        .recover_failed_processing_items(chassis.now_bin().map(|cart| cart.uuid), user)
        .await
        .map_err(|error| format!("failed to recover earlier checkouts: {error}"))?;

    let mut chassis = context
        .carts
        .resolve_chassis(user, Some(chassis))
        .await
        .map_err(|error| format!("failed to reload carts: {error}"))?;

    let preparation = context
        .checkout
        .prepare_chassis_for_payment(&mut chassis)
        .await
        .map_err(|error| format!("failed to prepare checkout: {error}"))?;

    println!("recovered_items: {recovered}");
    println!("path: {}", preparation.path);
    println!("processing_cart: {}", preparation.processing_cart.uuid);
    println!("ready: {}", preparation.ready);
    println!("amount_to_charge: {}", preparation.amount_to_charge);

    for (item, outcome) in &preparation.outcomes {
        println!("  {item}: {outcome:?}");
    }

    Ok(())
}
