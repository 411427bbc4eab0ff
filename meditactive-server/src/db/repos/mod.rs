//! Repository traits and their PostgreSQL implementations
//!
//! Services depend on [`UserStore`] and [`IntervalStore`] only, so the
//! storage backend is chosen by whoever builds the application state.

pub mod intervals;
pub mod users;

use async_trait::async_trait;

use crate::models::{DateRange, GoalName, IntervalFilter, NewInterval, NewUser, UserPatch};

pub use intervals::{Interval, IntervalRepo};
pub use users::{User, UserRepo};

/// Database error type
///
/// Constraint violations are split out of [`sqlx::Error`] so callers can
/// map them without inspecting vendor codes.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("duplicate value violates unique constraint '{constraint}'")]
    Duplicate { constraint: String },

    #[error("referenced row does not exist (constraint '{constraint}')")]
    MissingReference { constraint: String },

    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let constraint = db.constraint().unwrap_or("unknown").to_owned();
            if db.is_unique_violation() {
                return Self::Duplicate { constraint };
            }
            if db.is_foreign_key_violation() {
                return Self::MissingReference { constraint };
            }
        }
        Self::Sqlx(e)
    }
}

/// Persistence operations on users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user and return the stored row.
    async fn insert(&self, user: &NewUser) -> Result<User, DbError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, DbError>;

    async fn find(&self, id: i64) -> Result<Option<User>, DbError>;

    /// Overwrite the supplied fields. `None` if no row matched.
    async fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, DbError>;

    /// Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, DbError>;
}

/// Persistence operations on intervals and their goals.
#[async_trait]
pub trait IntervalStore: Send + Sync {
    /// Insert an interval and return it joined with its owner.
    async fn insert(&self, interval: &NewInterval) -> Result<Interval, DbError>;

    /// Intervals matching every filter, most recently created first.
    async fn list(&self, filter: &IntervalFilter) -> Result<Vec<Interval>, DbError>;

    async fn find(&self, id: i64) -> Result<Option<Interval>, DbError>;

    /// Replace the date range. `None` if no row matched.
    async fn update_range(&self, id: i64, range: DateRange) -> Result<Option<Interval>, DbError>;

    /// Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, DbError>;

    /// Attach a goal and return the interval with its refreshed goal list.
    async fn add_goal(&self, id: i64, goal: &GoalName) -> Result<Interval, DbError>;
}
