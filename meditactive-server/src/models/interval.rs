//! Interval and goal input validation
//!
//! Request field names follow the public API (`dataInizio`, `dataFine`,
//! `utenteId`, `obiettivo`, `obiettivi`).

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use super::validation::{bounded, required};
use super::ValidationError;

/// Maximum length for goal names
pub const MAX_GOAL_LEN: usize = 255;

/// Escape character used in LIKE patterns
pub const LIKE_ESCAPE: char = '\\';

/// Parse a request date: `YYYY-MM-DD`, or an RFC 3339 timestamp whose
/// date part is kept.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: value.to_owned(),
        })
}

/// Inclusive date range with `end >= start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting an end date before the start date.
    ///
    /// A single-day range (`start == end`) is valid.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Raw interval fields as they arrive in a request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalFields {
    pub data_inizio: Option<String>,
    pub data_fine: Option<String>,
    pub utente_id: Option<i64>,
}

/// Fully validated interval ready for insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewInterval {
    pub range: DateRange,
    pub user_id: i64,
}

impl TryFrom<IntervalFields> for NewInterval {
    type Error = ValidationError;

    fn try_from(fields: IntervalFields) -> Result<Self, Self::Error> {
        let start = required("dataInizio", fields.data_inizio)?;
        let end = required("dataFine", fields.data_fine)?;
        let user_id = fields
            .utente_id
            .ok_or(ValidationError::Missing { field: "utenteId" })?;

        let range = DateRange::new(
            parse_date("dataInizio", &start)?,
            parse_date("dataFine", &end)?,
        )?;

        Ok(Self { range, user_id })
    }
}

/// Partial interval update; `None` keeps the stored date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPatch {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl IntervalPatch {
    /// Merge the patch over the stored dates and re-check ordering.
    pub fn apply(&self, start: NaiveDate, end: NaiveDate) -> Result<DateRange, ValidationError> {
        DateRange::new(self.start.unwrap_or(start), self.end.unwrap_or(end))
    }
}

impl TryFrom<IntervalFields> for IntervalPatch {
    type Error = ValidationError;

    fn try_from(fields: IntervalFields) -> Result<Self, Self::Error> {
        // utenteId is not updatable and does not count as a change
        if fields.data_inizio.is_none() && fields.data_fine.is_none() {
            return Err(ValidationError::NoChanges);
        }

        let start = fields
            .data_inizio
            .map(|s| parse_date("dataInizio", &s))
            .transpose()?;
        let end = fields
            .data_fine
            .map(|s| parse_date("dataFine", &s))
            .transpose()?;

        Ok(Self { start, end })
    }
}

/// Validated goal name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalName(String);

impl GoalName {
    /// Create a goal name.
    ///
    /// # Rules
    /// - Non-empty (whitespace only is rejected)
    /// - Max 255 characters
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self(bounded("obiettivo", s.into(), MAX_GOAL_LEN)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body of `POST /api/intervals/{id}/obiettivi`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalFields {
    pub obiettivo: Option<String>,
}

impl TryFrom<GoalFields> for GoalName {
    type Error = ValidationError;

    fn try_from(fields: GoalFields) -> Result<Self, Self::Error> {
        Self::new(required("obiettivo", fields.obiettivo)?)
    }
}

/// Raw list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalQuery {
    pub obiettivi: Option<String>,
    pub data_inizio: Option<String>,
    pub data_fine: Option<String>,
}

/// Validated list filters, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalFilter {
    /// Case-sensitive substring matched against any goal name
    pub goal: Option<String>,
    /// `start_date >= start_from`
    pub start_from: Option<NaiveDate>,
    /// `end_date <= end_to`
    pub end_to: Option<NaiveDate>,
}

impl IntervalFilter {
    /// LIKE pattern for the goal filter, with wildcards in the input escaped.
    pub fn goal_pattern(&self) -> Option<String> {
        self.goal.as_deref().map(|g| format!("%{}%", escape_like(g)))
    }
}

impl TryFrom<IntervalQuery> for IntervalFilter {
    type Error = ValidationError;

    fn try_from(query: IntervalQuery) -> Result<Self, Self::Error> {
        // ?obiettivi=&dataInizio= means "no filter"; whitespace is a real value
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());

        Ok(Self {
            goal: present(query.obiettivi),
            start_from: present(query.data_inizio)
                .map(|s| parse_date("dataInizio", &s))
                .transpose()?,
            end_to: present(query.data_fine)
                .map(|s| parse_date("dataFine", &s))
                .transpose()?,
        })
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
///
/// # Example
/// ```
/// use meditactive_server::models::escape_like;
///
/// assert_eq!(escape_like("100%_done"), r"100\%\_done");
/// ```
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
