//! CLI module for the PMP auth service
//!
//! - `serve`: run the HTTP API
//! - `check-config`: validate configuration and print it with secrets hidden
//! - `generate-secret`: print a random signing secret

pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// PMP Auth Service - username/password login with bearer tokens
#[derive(Parser)]
#[command(name = "pmp-auth-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Validate configuration and print a redacted summary
    CheckConfig,

    /// Print a random secret suitable for JWT_SECRET
    GenerateSecret,
}

/// Load and validate configuration without starting anything
pub fn check_config() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    println!("{}", config.redacted_summary());
    config.validate()?;
    println!("\nConfiguration is valid");

    Ok(())
}

pub fn generate_secret() -> anyhow::Result<()> {
    println!("{}", crate::generate_secret());
    Ok(())
}
