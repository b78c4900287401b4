use clap::{Args, Subcommand};

mod cheque;
mod complete;
mod prepare;

#[derive(Debug, Args)]
pub(crate) struct CheckoutCommand {
    #[command(subcommand)]
    command: CheckoutSubcommand,
}

#[derive(Debug, Subcommand)]
enum CheckoutSubcommand {
    Prepare(prepare::PrepareArgs),
    Cheque(cheque::ChequeArgs),
    Complete(complete::CompleteArgs),
}

pub(crate) async fn run(command: CheckoutCommand) -> Result<(), String> {
    match command.command {
        CheckoutSubcommand::Prepare(args) => prepare::run(args).await,
        CheckoutSubcommand::Cheque(args) => cheque::run(args).await,
        CheckoutSubcommand::Complete(args) => complete::run(args).await,
    }
}
