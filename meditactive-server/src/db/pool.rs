//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. The pool is created
//! once by the binary and handed to the repositories; nothing here is global.

use std::fmt;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection settings.
///
/// When `url` is set it wins over the discrete fields.
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub url: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "meditactive".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            url: None,
        }
    }
}

// Hand-written so the password never reaches the logs
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DbConfig {
    /// Build sqlx connect options from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is set and cannot be parsed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return url.parse();
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);

        if !self.password.is_empty() {
            options = options.password(&self.password);
        }

        Ok(options)
    }
}

/// Create a PostgreSQL connection pool.
///
/// Connects eagerly so an unreachable database is reported at startup.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DbConfig::default()).await?;
/// ```
pub async fn create_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    let options = config.connect_options()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        host = %config.host,
        database = %config.name,
        max_connections = config.max_connections,
        "database pool ready"
    );

    Ok(pool)
}
