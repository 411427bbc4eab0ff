//! meditactive-server: REST API for users, intervals and goals
//!
//! Layers, leaves first:
//! - [`models`]: request validation and domain value types
//! - [`db`]: PostgreSQL pool, schema bootstrap and store traits
//! - [`services`]: business rules over the stores
//! - [`http`]: axum routes, extractors and the JSON error envelope

pub mod db;
pub mod http;
pub mod models;
pub mod services;

#[cfg(test)]
mod testing;

pub use db::{create_pool, DbConfig};
pub use http::{build_router, run_server, AppState, Environment, ServerConfig, ServerError};
