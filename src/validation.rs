//! Field rules for request bodies. Violations are collected rather than
//! returned on the first failure, so a client sees every problem at once.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

// Literal patterns. `patterns_compile` covers both `expect`s.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

static COLOR_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{6}([A-Z0-9]{3})?$").expect("color pattern compiles"));

pub const MAX_NAME_LEN: usize = 255;

pub trait Validate {
    fn validate(&self, violations: &mut Violations);

    fn check(&self) -> Result<(), AppError> {
        let mut violations = Violations::default();
        self.validate(&mut violations);
        violations.into_result()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }

    /// Required, non-blank text with an optional length cap.
    pub fn required_text(&mut self, field: &str, value: &str, max_len: Option<usize>) {
        if value.trim().is_empty() {
            self.push(format!("{field} should not be empty"));
        }
        if let Some(max) = max_len {
            if value.chars().count() > max {
                self.push(format!(
                    "{field} must be shorter than or equal to {max} characters"
                ));
            }
        }
    }

    /// Same rules as [`Violations::required_text`], applied only when present.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: Option<usize>) {
        if let Some(value) = value {
            self.required_text(field, value, max_len);
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !EMAIL.is_match(value) {
            self.push(format!("{field} must be an email"));
        }
    }

    pub fn color_code(&mut self, field: &str, value: &str) {
        if !COLOR_CODE.is_match(value) {
            self.push(format!("{field} must be in uppercase."));
        }
    }

    pub fn not_in_past(&mut self, field: &str, value: &DateTime<Utc>) {
        if *value < Utc::now() {
            self.push(format!(
                "{field} {} has already expired",
                value.to_rfc3339()
            ));
        }
    }

    pub fn non_negative(&mut self, field: &str, value: i64) {
        if value < 0 {
            self.push(format!("{field} must not be less than 0"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn patterns_compile() {
        Lazy::force(&EMAIL);
        Lazy::force(&COLOR_CODE);
    }

    #[test]
    fn collects_every_violation() {
        let mut violations = Violations::default();
        violations.required_text("name", "  ", Some(3));
        violations.email("email", "not-an-email");
        violations.color_code("colorCode", "ffffff");

        assert_eq!(
            violations.messages(),
            &[
                "name should not be empty".to_string(),
                "email must be an email".to_string(),
                "colorCode must be in uppercase.".to_string(),
            ]
        );
        assert!(matches!(
            violations.into_result(),
            Err(AppError::Validation(messages)) if messages.len() == 3
        ));
    }

    #[test]
    fn length_cap_counts_characters() {
        let mut violations = Violations::default();
        violations.required_text("name", &"é".repeat(255), Some(MAX_NAME_LEN));
        assert!(violations.is_empty());
        violations.required_text("name", &"a".repeat(256), Some(MAX_NAME_LEN));
        assert_eq!(
            violations.messages(),
            &["name must be shorter than or equal to 255 characters".to_string()]
        );
    }

    #[test]
    fn color_codes_are_six_or_nine_uppercase_characters() {
        let mut violations = Violations::default();
        violations.color_code("colorCode", "28A745");
        violations.color_code("colorCode", "FFFFFFFFF");
        assert!(violations.is_empty());
        violations.color_code("colorCode", "FFFFFFF");
        assert_eq!(violations.messages().len(), 1);
    }

    #[test]
    fn past_dates_are_rejected() {
        let mut violations = Violations::default();
        violations.not_in_past("deadline", &(Utc::now() + Duration::hours(1)));
        assert!(violations.is_empty());
        violations.not_in_past("deadline", &(Utc::now() - Duration::hours(1)));
        assert!(violations.messages()[0].ends_with("has already expired"));
    }

    #[test]
    fn email_shape() {
        let mut violations = Violations::default();
        violations.email("email", "email@mail.com");
        assert!(violations.is_empty());
        violations.email("email", "email@mail");
        assert!(!violations.is_empty());
    }
}
