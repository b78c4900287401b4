use clap::Args;
use uuid::Uuid;
use wellington::charges::ChargeState;
use wellington_app::domain::charges::records::ChargeUuid;

use crate::cli::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct SettleChargeArgs {
    /// Pending charge to settle
    #[arg(long)]
    charge: Uuid,

    /// Final state (successful, failed)
    #[arg(long)]
    state: ChargeState,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(args: SettleChargeArgs) -> Result<(), String> {
    let context = args.services.context().await?;

    let charge = context
        .charges
        .settle_charge(ChargeUuid::from_uuid(args.charge), args.state)
        .await
        .map_err(|error| format!("failed to settle charge: {error}"))?;

    println!("charge_uuid: {}", charge.uuid);
    println!("state: {}", charge.state);

    Ok(())
}
