//! Tracing setup for the meditactive binary
//!
//! Console output always; a daily-rolling log file when a log directory is
//! configured.
//!
//! Usage:
//!   meditactive serve                      # debug level in development
//!   APP_ENV=production meditactive serve   # info level
//!   RUST_LOG=meditactive_server=trace ...  # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                               # Log filter (wins over APP_ENV)
//!   LOG_DIR                                # Also write logs to LOG_DIR/meditactive.log.YYYY-MM-DD

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// File name prefix for rolled log files
const LOG_FILE_PREFIX: &str = "meditactive.log";

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Production mode: info level and no targets
    pub production: bool,
    /// Directory for rolling log files
    pub log_dir: Option<PathBuf>,
}

impl TracingConfig {
    fn default_directive(&self) -> &'static str {
        if self.production {
            "info"
        } else {
            "debug"
        }
    }
}

/// Initialize tracing.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the lifetime of the process.
pub fn init(config: &TracingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let console = fmt::layer()
        .with_target(!config.production)
        .compact();

    let (file, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
