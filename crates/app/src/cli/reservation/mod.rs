use clap::{Args, Subcommand};

mod owed;

#[derive(Debug, Args)]
pub(crate) struct ReservationCommand {
    #[command(subcommand)]
    command: ReservationSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReservationSubcommand {
    Owed(owed::OwedArgs),
}

pub(crate) async fn run(command: ReservationCommand) -> Result<(), String> {
    match command.command {
        ReservationSubcommand::Owed(args) => owed::run(args).await,
    }
}
