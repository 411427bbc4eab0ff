//! Schema bootstrap command

use anyhow::{Context, Result};
use clap::Parser;

use meditactive_server::db::{create_pool, schema, DbConfig};

use super::DbArgs;

/// Arguments for the setup-db command
#[derive(Parser, Debug)]
pub struct SetupDbArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

/// Create the tables and indexes if they do not exist.
pub async fn run_setup_db(args: SetupDbArgs) -> Result<()> {
    let config: DbConfig = args.db.into();
    tracing::debug!(?config, "setting up database");

    let pool = create_pool(&config)
        .await
        .context("Failed to connect to database")?;

    schema::ensure(&pool)
        .await
        .context("Failed to create database schema")?;

    tracing::info!("Database schema is ready");
    Ok(())
}
