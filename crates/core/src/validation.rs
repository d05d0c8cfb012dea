//! Field-level validation results.
//!
//! Validators collect every failing field instead of stopping at the first,
//! so a client gets the full list in one round trip. The `check_*` helpers
//! each encode one row of the field → constraint table and are shared by the
//! user and property validators.

use serde::Serialize;

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Accumulated validation failures, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Merge errors produced by a nested validator.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Required, trimmed string whose char count is within `min..=max`.
    pub fn check_length(&mut self, field: &str, value: &str, min: usize, max: usize, message: &str) {
        let len = value.trim().chars().count();
        if len < min || len > max {
            self.push(field, message);
        }
    }

    /// Optional string capped at `max` chars.
    pub fn check_max_length(&mut self, field: &str, value: Option<&str>, max: usize, message: &str) {
        if let Some(v) = value {
            if v.trim().chars().count() > max {
                self.push(field, message);
            }
        }
    }

    pub fn check_not_blank(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    /// Finite number no smaller than `min`.
    pub fn check_min_f64(&mut self, field: &str, value: f64, min: f64, message: &str) {
        if !value.is_finite() || value < min {
            self.push(field, message);
        }
    }

    pub fn check_min_u32(&mut self, field: &str, value: u32, min: u32, message: &str) {
        if value < min {
            self.push(field, message);
        }
    }

    pub fn check_range_u8(&mut self, field: &str, value: u8, min: u8, max: u8, message: &str) {
        if value < min || value > max {
            self.push(field, message);
        }
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_is_ok_when_nothing_recorded() {
        let errors = ValidationErrors::new();
        assert_eq!(errors.finish(7).unwrap(), 7);
    }

    #[test]
    fn length_counts_trimmed_chars() {
        let mut errors = ValidationErrors::new();
        errors.check_length("title", "   abcd   ", 5, 100, "too short");
        errors.check_length("title2", "ñandú", 5, 100, "too short");
        assert_eq!(errors.len(), 1);
        assert!(errors.has_field("title"));
    }

    #[test]
    fn min_f64_rejects_nan_and_negatives() {
        let mut errors = ValidationErrors::new();
        errors.check_min_f64("rent", f64::NAN, 0.0, "bad");
        errors.check_min_f64("deposit", -1.0, 0.0, "bad");
        errors.check_min_f64("ok", 0.0, 0.0, "bad");
        assert_eq!(errors.len(), 2);
        assert!(!errors.has_field("ok"));
    }

    #[test]
    fn display_joins_messages_like_the_envelope() {
        let mut errors = ValidationErrors::new();
        errors.push("a", "First");
        errors.push("b", "Second");
        assert_eq!(errors.to_string(), "First, Second");
    }
}
