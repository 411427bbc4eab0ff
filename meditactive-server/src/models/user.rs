//! User input validation
//!
//! Requests arrive as [`UserFields`] (every field optional) and are turned
//! into either a [`NewUser`] (all fields required) or a [`UserPatch`]
//! (at least one field required).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::validation::{bounded, required};
use super::ValidationError;

/// Maximum length for email addresses
pub const MAX_EMAIL_LEN: usize = 255;

/// Maximum length for first and last names
pub const MAX_NAME_LEN: usize = 100;

/// Loose shape check: something@something, no whitespace
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("invalid email regex"));

/// Validated email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Create a new email, validating length and shape.
    ///
    /// # Example
    /// ```
    /// use meditactive_server::models::Email;
    ///
    /// assert!(Email::new("a@b.com").is_ok());
    /// assert!(Email::new("not-an-email").is_err());
    /// assert!(Email::new("").is_err());
    /// ```
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = bounded("email", s.into(), MAX_EMAIL_LEN)?;

        if !EMAIL_RE.is_match(&s) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must be a valid email address",
            });
        }

        Ok(Self(s))
    }

    /// Get the email as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw user fields as they arrive in a request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFields {
    pub email: Option<String>,
    pub nome: Option<String>,
    pub cognome: Option<String>,
}

/// Fully validated user ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: Email,
    pub nome: String,
    pub cognome: String,
}

impl TryFrom<UserFields> for NewUser {
    type Error = ValidationError;

    fn try_from(fields: UserFields) -> Result<Self, Self::Error> {
        let email = required("email", fields.email)?;
        let nome = required("nome", fields.nome)?;
        let cognome = required("cognome", fields.cognome)?;

        Ok(Self {
            email: Email::new(email)?,
            nome: bounded("nome", nome, MAX_NAME_LEN)?,
            cognome: bounded("cognome", cognome, MAX_NAME_LEN)?,
        })
    }
}

/// Partial user update; `None` leaves the column untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<Email>,
    pub nome: Option<String>,
    pub cognome: Option<String>,
}

impl TryFrom<UserFields> for UserPatch {
    type Error = ValidationError;

    fn try_from(fields: UserFields) -> Result<Self, Self::Error> {
        if fields.email.is_none() && fields.nome.is_none() && fields.cognome.is_none() {
            return Err(ValidationError::NoChanges);
        }

        Ok(Self {
            email: fields.email.map(Email::new).transpose()?,
            nome: fields
                .nome
                .map(|n| bounded("nome", n, MAX_NAME_LEN))
                .transpose()?,
            cognome: fields
                .cognome
                .map(|c| bounded("cognome", c, MAX_NAME_LEN))
                .transpose()?,
        })
    }
}
