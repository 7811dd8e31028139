//! Form validation.
//!
//! Every form in the site funnels through [`Validator`], which collects at
//! most one message per field. Handlers re-render the form with the
//! collected [`ValidationErrors`] when anything fails.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex pattern"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ().-]{7,20}$").expect("Invalid regex pattern"));

/// Check whether a string looks like an email address.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Check whether a string looks like a phone number.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value.trim())
}

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name.
    pub field: String,
    /// Message shown next to the field.
    pub message: String,
}

/// Collected validation failures, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless it already has one.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if !self.has(&field) {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// The message for `field`, or an empty string. Used by templates.
    #[must_use]
    pub fn message(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Iterate over all failures in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Convert into a `Result`, failing if any error was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the set is not empty.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Builder-style field checker.
///
/// ```
/// use pimp::validation::Validator;
///
/// let mut v = Validator::new();
/// v.required("email", "", "Email")
///     .email("email", "");
/// let errors = v.finish();
/// assert_eq!(errors.message("email"), "Email is required");
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    /// Create a validator with no errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value must contain something other than whitespace.
    pub fn required(&mut self, field: &str, value: &str, label: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.add(field, format!("{label} is required"));
        }
        self
    }

    /// The value must not exceed `max` characters.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize, label: &str) -> &mut Self {
        if value.trim().chars().count() > max {
            self.errors
                .add(field, format!("{label} must be at most {max} characters"));
        }
        self
    }

    /// A non-empty value must have at least `min` characters.
    pub fn min_len(&mut self, field: &str, value: &str, min: usize, label: &str) -> &mut Self {
        let len = value.trim().chars().count();
        if len > 0 && len < min {
            self.errors
                .add(field, format!("{label} must be at least {min} characters"));
        }
        self
    }

    /// A non-empty value must be an email address.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_email(value) {
            self.errors.add(field, "Enter a valid email address");
        }
        self
    }

    /// A non-empty value must be a phone number.
    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_phone(value) {
            self.errors.add(field, "Enter a valid phone number");
        }
        self
    }

    /// A non-empty value must be an `http` or `https` URL.
    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty()
            && !(value.starts_with("http://") || value.starts_with("https://"))
        {
            self.errors
                .add(field, "Enter a full URL starting with http:// or https://");
        }
        self
    }

    /// `confirmation` must equal `value`.
    pub fn matches(&mut self, field: &str, value: &str, confirmation: &str) -> &mut Self {
        if value != confirmation {
            self.errors.add(field, "Passwords do not match");
        }
        self
    }

    /// The value must parse to an integer within `min..=max`.
    pub fn int_range(
        &mut self,
        field: &str,
        value: &str,
        min: i64,
        max: i64,
        label: &str,
    ) -> &mut Self {
        match value.trim().parse::<i64>() {
            Ok(n) if (min..=max).contains(&n) => {}
            _ => self
                .errors
                .add(field, format!("{label} must be between {min} and {max}")),
        }
        self
    }

    /// The value must be one of `allowed`.
    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str], label: &str) -> &mut Self {
        if !allowed.contains(&value) {
            self.errors.add(field, format!("Choose a {label}"));
        }
        self
    }

    /// A checkbox that must be ticked.
    pub fn checked(&mut self, field: &str, checked: bool, message: &str) -> &mut Self {
        if !checked {
            self.errors.add(field, message);
        }
        self
    }

    /// Record an arbitrary failure.
    pub fn fail(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.add(field, message);
        self
    }

    /// Whether nothing has failed so far.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Finish and return the collected errors.
    #[must_use]
    pub fn finish(self) -> ValidationErrors {
        self.errors
    }
}

/// Interpret an HTML checkbox value.
#[must_use]
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(value, Some("on" | "true" | "1" | "yes"))
}
