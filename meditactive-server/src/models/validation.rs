//! Validation error types

use std::fmt;

use chrono::NaiveDate;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field was not supplied
    Missing { field: &'static str },

    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., email)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Date could not be parsed
    InvalidDate { field: &'static str, value: String },

    /// End date precedes start date
    InvertedRange { start: NaiveDate, end: NaiveDate },

    /// Partial update without any updatable field
    NoChanges,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidDate { field, value } => {
                write!(f, "{}: '{}' is not a valid date (expected YYYY-MM-DD)", field, value)
            }
            Self::InvertedRange { start, end } => {
                write!(f, "end date {} cannot be before start date {}", end, start)
            }
            Self::NoChanges => write!(f, "no fields to update were provided"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Take a required string field, rejecting absent and blank values.
pub(crate) fn required(
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::Missing { field })?;
    non_blank(field, value)
}

/// Reject blank strings and enforce a maximum length in characters.
pub(crate) fn bounded(
    field: &'static str,
    value: String,
    max: usize,
) -> Result<String, ValidationError> {
    let value = non_blank(field, value)?;
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(value)
}

fn non_blank(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value)
}
