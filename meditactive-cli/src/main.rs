//! meditactive CLI - MeditActive API server
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `setup-db`: create the database schema
//!
//! Settings come from flags, then the environment, then a `.env` file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use meditactive_server::Environment;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "meditactive",
    author,
    version,
    about = "REST API for tracking meditation intervals and their goals"
)]
struct Cli {
    /// Deployment environment (development or production)
    #[arg(long = "env", env = "APP_ENV", default_value = "development", global = true)]
    environment: Environment,

    /// Also write logs to daily files in this directory
    #[arg(long, env = "LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::ServeArgs),
    /// Create the database tables and indexes
    SetupDb(commands::SetupDbArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = tracing_setup::init(&TracingConfig {
        production: cli.environment.is_production(),
        log_dir: cli.log_dir.clone(),
    })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, cli.environment).await?,
        Commands::SetupDb(args) => commands::run_setup_db(args).await?,
    }
    Ok(())
}
