//! Collected field-level validation failures.
//!
//! Form validation reports every failing field at once rather than stopping
//! at the first problem; [`FieldErrors`] is the accumulator and converts into
//! a single `invalid_request` [`Error`] whose details list each field.

use serde::Serialize;
use serde_json::json;

use super::Error;

/// One failing form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// camelCase field name as submitted by the form.
    pub field: &'static str,
    /// Stable machine-readable reason.
    pub code: &'static str,
    /// Message suitable for display next to the field.
    pub message: String,
}

/// Ordered list of field failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure.
    pub fn push(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            code,
            message: message.into(),
        });
    }

    /// Run `result`, recording its error under `field` and yielding the value
    /// on success.
    pub fn check<T, E>(&mut self, field: &'static str, result: Result<T, E>) -> Option<T>
    where
        E: FieldFailure,
    {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(field, err.code(), err.to_string());
                None
            }
        }
    }

    /// Whether no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded failures in submission order.
    pub fn as_slice(&self) -> &[FieldError] {
        self.0.as_slice()
    }

    /// Whether `field` has at least one failure.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// Convert into an `invalid_request` error listing every field.
    ///
    /// # Examples
    /// ```
    /// use patient_intake::domain::{ErrorCode, FieldErrors};
    ///
    /// let mut errors = FieldErrors::new();
    /// errors.push("email", "invalid_email", "email must be a valid address");
    /// let err = errors.into_error();
    /// assert_eq!(err.code(), ErrorCode::InvalidRequest);
    /// ```
    pub fn into_error(self) -> Error {
        let message = match self.0.as_slice() {
            [only] => only.message.clone(),
            _ => "form contains invalid fields".to_owned(),
        };
        Error::invalid_request(message).with_details(json!({ "fields": self.0 }))
    }
}

/// Validation errors that can be attributed to a form field.
pub trait FieldFailure: std::fmt::Display {
    /// Stable machine-readable reason.
    fn code(&self) -> &'static str;
}
