//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod user;
pub mod interval;

pub use validation::ValidationError;
pub use user::{Email, NewUser, UserFields, UserPatch};
pub use interval::{
    escape_like, parse_date, DateRange, GoalFields, GoalName, IntervalFields, IntervalFilter,
    IntervalPatch, IntervalQuery, NewInterval,
};
