use clap::Args;
use uuid::Uuid;
use wellington_app::domain::users::records::UserUuid;

use crate::cli::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct ChequeArgs {
    /// User paying by cheque
    #[arg(long)]
    user: Uuid,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(args: ChequeArgs) -> Result<(), String> {
    let context = args.services.context().await?;
    let user = UserUuid::from_uuid(args.user);

    let chassis = context
        .carts
        .resolve_chassis(user, None)
        .await
        .map_err(|error| format!("failed to load carts: {error}"))?;

    context
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

    if !preparation.ready {
        return Err(format!(
            "cart {} is not ready for payment",
            preparation.processing_cart.uuid
        ));
    }

    context
        .checkout
        .wait_for_cheque_housekeeping(&mut chassis)
        .await
        .map_err(|error| format!("failed to park cart for cheque: {error}"))?;

    println!("awaiting_cheque: {}", preparation.processing_cart.uuid);

    Ok(())
}
