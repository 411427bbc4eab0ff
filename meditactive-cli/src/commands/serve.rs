//! HTTP server command
//!
//! Runs the MeditActive API until Ctrl+C or SIGTERM.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;

use meditactive_server::db::{create_pool, schema};
use meditactive_server::http::{run_server, Environment, ServerConfig};

use super::DbArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "BIND_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Create missing tables before serving
    #[arg(long)]
    pub setup_db: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, environment: Environment) -> Result<()> {
    let bind_addr = SocketAddr::new(args.host, args.port);
    tracing::info!(%environment, "Starting meditactive server on {}", bind_addr);

    // A database that cannot be reached at startup is fatal
    let pool = create_pool(&args.db.into())
        .await
        .context("Failed to connect to database")?;

    if args.setup_db {
        schema::ensure(&pool)
            .await
            .context("Failed to create database schema")?;
    }

    let config = ServerConfig {
        bind_addr,
        environment,
    };

    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
