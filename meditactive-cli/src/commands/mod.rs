//! Command implementations

pub mod serve;
pub mod setup_db;

pub use serve::{run_serve, ServeArgs};
pub use setup_db::{run_setup_db, SetupDbArgs};

use clap::Args;
use meditactive_server::db::pool::DEFAULT_MAX_CONNECTIONS;
use meditactive_server::DbConfig;

/// Database connection arguments shared by every command
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Full connection URL; overrides the discrete settings below
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, env = "DB_NAME", default_value = "meditactive")]
    pub db_name: String,

    /// Upper bound on pooled connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub db_max_connections: u32,
}

impl From<DbArgs> for DbConfig {
    fn from(args: DbArgs) -> Self {
        Self {
            host: args.db_host,
            port: args.db_port,
            user: args.db_user,
            password: args.db_password,
            name: args.db_name,
            max_connections: args.db_max_connections,
            url: args.database_url.filter(|url| !url.trim().is_empty()),
        }
    }
}
