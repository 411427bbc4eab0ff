//! Entity services: validation and business rules over the stores
//!
//! Services own no state beyond their store handles and are cheap to clone.

pub mod intervals;
pub mod users;

pub use intervals::IntervalService;
pub use users::UserService;

use crate::db::DbError;
use crate::models::ValidationError;

/// Error taxonomy shared by every service operation
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed, missing or oversized input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Referenced entity is absent
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: i64 },

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Foreign key violation
    #[error("{0}")]
    Referential(String),

    /// Anything else the store reported
    #[error("storage failure: {0}")]
    Storage(#[source] sqlx::Error),
}

impl ServiceError {
    pub(crate) fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound { resource, id }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Duplicate { .. } => {
                Self::Conflict("duplicate value: this record already exists".into())
            }
            DbError::MissingReference { .. } => Self::Referential(
                "invalid reference: make sure every referenced record exists".into(),
            ),
            DbError::Sqlx(e) => Self::Storage(e),
        }
    }
}
