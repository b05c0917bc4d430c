use crate::batch::{
    run_audit, run_compare, run_prepurchase, AuditArgs, CompareArgs, PrePurchaseArgs,
};
use crate::server;
use carebridge::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "CareBridge",
    about = "Audit rejected health insurance claims and screen policies before purchase",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Audit a claim rejection against the policy wording and print the report as JSON
    Audit(AuditArgs),
    /// Screen a single policy document before purchase
    Prepurchase(PrePurchaseArgs),
    /// Screen two policy documents and recommend one
    Compare(CompareArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Audit(args) => run_audit(args).await,
        Command::Prepurchase(args) => run_prepurchase(args).await,
        Command::Compare(args) => run_compare(args).await,
    }
}
