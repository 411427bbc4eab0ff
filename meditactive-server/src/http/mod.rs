//! HTTP server layer
//!
//! Axum server with:
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses, with internal detail only in development

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{
    build_router, run_server, AppState, Environment, ParseEnvironmentError, ServerConfig,
    ServerError,
};
