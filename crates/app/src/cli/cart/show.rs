use clap::Args;
use uuid::Uuid;
use wellington_app::domain::{
    carts::records::{CartItemRecord, CartRecord},
    users::records::UserUuid,
};

use crate::cli::ServiceArgs;

#[derive(Debug, Args)]
pub(crate) struct ShowCartArgs {
    /// User whose carts to show
    #[arg(long)]
    user: Uuid,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(args: ShowCartArgs) -> Result<(), String> {
    let context = args.services.context().await?;

    let chassis = context
        .carts
        .resolve_chassis(UserUuid::from_uuid(args.user), None)
        .await
        .map_err(|error| format!("failed to load carts: {error}"))?;

    print_bin("now", chassis.now_bin());
    print_bin("later", chassis.later_bin());

    println!("can_proceed_to_payment: {}", chassis.can_proceed_to_payment());
    println!("payment_by_cheque_allowed: {}", chassis.payment_by_cheque_allowed());

    Ok(())
}

fn print_bin(label: &str, cart: Option<&CartRecord>) {
    let Some(cart) = cart else {
        println!("{label}: none");

        return;
    };

    println!("{label}: {} ({})", cart.uuid, cart.status);

    for item in &cart.items {
        print_item(item);
    }
}

fn print_item(item: &CartItemRecord) {
    let holdable = item
        .reservation()
        .map_or_else(|| "unclaimed".to_string(), |reservation| reservation.to_string());

    println!(
        "  {} {} {} {} [{}]",
        item.uuid, item.item_name, item.kind, item.item_price_cents, holdable
    );
}
