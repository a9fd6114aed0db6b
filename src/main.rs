use clap::Parser;
use pmp_auth_service::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::CheckConfig => cli::check_config(),
        Command::GenerateSecret => cli::generate_secret(),
    }
}
