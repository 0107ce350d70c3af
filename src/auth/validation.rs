//! Field-level validation for account payloads.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid");
}

/// Validation error with a user-facing message.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must not be empty", label))
    }

    pub fn invalid_email(field: &str) -> Self {
        Self::new(field, "Email address is not valid")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// All messages joined for an API error body
    pub fn to_message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn into_result(self) -> Result<(), String> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.to_message())
        }
    }
}

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Validate email shape; empty values are reported by [`validate_required`]
pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if !trimmed.is_empty() && !EMAIL.is_match(trimmed) {
        errors.add(ValidationError::invalid_email(field));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credentials_pass() {
        let mut errors = ValidationErrors::new();
        validate_required("hr@example.com", "email", "Email", &mut errors);
        validate_email("hr@example.com", "email", &mut errors);
        validate_required("secret", "password", "Password", &mut errors);
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn test_errors_are_collected() {
        let mut errors = ValidationErrors::new();
        validate_email("not-an-email", "email", &mut errors);
        validate_required("  ", "password", "Password", &mut errors);

        assert_eq!(errors.len(), 2);
        let message = errors.into_result().unwrap_err();
        assert!(message.contains("[email] Email address is not valid"));
        assert!(message.contains("[password] Password must not be empty"));
    }

    #[test]
    fn test_empty_email_only_reported_once() {
        let mut errors = ValidationErrors::new();
        validate_required("", "email", "Email", &mut errors);
        validate_email("", "email", &mut errors);
        assert_eq!(errors.len(), 1);
    }
}
