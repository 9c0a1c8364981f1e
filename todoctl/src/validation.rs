//! Field validation for untrusted request payloads.
//!
//! A [`Validator`] is created fresh for every payload and accumulates at most one
//! error message per field. Rules run in the order they are declared; once a field
//! has an error, every later rule for that field is skipped, so the surviving
//! message always belongs to the first rule that failed.
//!
//! ```
//! use todoctl::validation::Validator;
//!
//! let mut v = Validator::new();
//! v.required("title", "");
//! v.min_length("title", "", 3); // skipped, title already failed
//! assert!(!v.is_valid());
//! assert_eq!(v.errors().get("title"), Some("title is a required field"));
//! ```

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};

use crate::errors::Error;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

/// Field name to error message, at most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One side of a [`Validator::must_match`] comparison.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> Field<'a> {
    pub fn new(name: &'a str, value: &'a str) -> Self {
        Self { name, value }
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on the empty string.
    pub fn required(&mut self, field: &str, value: &str) -> bool {
        if self.has_error(field) {
            return false;
        }
        if value.is_empty() {
            return self.fail(field, format!("{field} is a required field"));
        }
        true
    }

    /// Fails when `value` has fewer than `length` characters. Empty values pass;
    /// pair with [`Validator::required`] when the field must be present.
    pub fn min_length(&mut self, field: &str, value: &str, length: usize) -> bool {
        if self.has_error(field) {
            return false;
        }
        if value.is_empty() {
            return true;
        }
        if value.chars().count() < length {
            return self.fail(field, format!("{field} not long enough, {length} characters is required"));
        }
        true
    }

    pub fn valid_email(&mut self, field: &str, value: &str) -> bool {
        if self.has_error(field) {
            return false;
        }
        if !EMAIL_REGEX.is_match(value) {
            return self.fail(field, "Email is invalid".to_string());
        }
        true
    }

    /// Fails when the two values differ, recording an error on both sides.
    /// A side that already carries an error keeps its original message.
    pub fn must_match(&mut self, a: Field<'_>, b: Field<'_>) -> bool {
        if a.value == b.value {
            return !self.has_error(a.name) && !self.has_error(b.name);
        }
        if !self.has_error(a.name) {
            self.fail(a.name, format!("{} must match {}", a.name, b.name));
        }
        if !self.has_error(b.name) {
            self.fail(b.name, format!("{} must match {}", b.name, a.name));
        }
        false
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    fn has_error(&self, field: &str) -> bool {
        self.errors.contains(field)
    }

    fn fail(&mut self, field: &str, message: String) -> bool {
        self.errors.0.insert(field.to_string(), message);
        false
    }
}

/// Implemented by request payloads that carry their own field rules.
pub trait Validate {
    fn validate(&self) -> ValidationErrors;
}

/// JSON body extractor that runs [`Validate`] before the handler sees the payload.
///
/// A body that does not decode is a 400 with the decoder's message; a body that
/// decodes but fails validation is a 400 carrying the per-field errors.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await.map_err(|rejection| Error::BadRequest {
            message: rejection.body_text(),
        })?;

        let errors = payload.validate();
        if !errors.is_empty() {
            return Err(Error::Validation { errors });
        }
        Ok(Self(payload))
    }
}
