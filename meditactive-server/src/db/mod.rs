//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - One pool, built once at startup and cloned into each repository
//! - Goal lists are aggregated in the same query as the interval (no N+1)
//! - Rely on DB constraints for uniqueness and cascades, translate the
//!   resulting vendor errors into [`DbError`]
//! - Transactions for write-then-read operations

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{create_pool, DbConfig};
pub use repos::*;
