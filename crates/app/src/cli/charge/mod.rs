use clap::{Args, Subcommand};

mod create;
mod settle;

#[derive(Debug, Args)]
pub(crate) struct ChargeCommand {
    #[command(subcommand)]
    command: ChargeSubcommand,
}

#[derive(Debug, Subcommand)]
enum ChargeSubcommand {
    Create(create::CreateChargeArgs),
    Settle(settle::SettleChargeArgs),
}

pub(crate) async fn run(command: ChargeCommand) -> Result<(), String> {
    match command.command {
        ChargeSubcommand::Create(args) => create::run(args).await,
        ChargeSubcommand::Settle(args) => settle::run(args).await,
    }
}
