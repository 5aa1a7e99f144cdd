//! Field validation rules shared by registration, profile updates and
//! department management.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// A rejected input field. The message is safe to show to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// CNIC format: `12345-1234567-1`.
static NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}-\d{7}-\d$").expect("national id pattern"));

/// Mobile numbers with a `0` or `+92` prefix, dash after the operator code optional.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+92|0)\d{3}-?\d{7}$").expect("phone pattern"));

static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("postal code pattern"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));

/// Minimum account password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Trim a required field, rejecting absent or blank values.
pub fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError(format!("{field} is required"))),
    }
}

/// Trim an optional field, collapsing blank values to `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn national_id(value: String) -> Result<String, ValidationError> {
    if NATIONAL_ID.is_match(&value) {
        Ok(value)
    } else {
        Err(ValidationError(
            "Please provide a valid CNIC number in format: 12345-1234567-1".into(),
        ))
    }
}

pub fn phone(value: String) -> Result<String, ValidationError> {
    if PHONE.is_match(&value) {
        Ok(value)
    } else {
        Err(ValidationError("Please provide a valid phone number".into()))
    }
}

pub fn postal_code(value: String) -> Result<String, ValidationError> {
    if POSTAL_CODE.is_match(&value) {
        Ok(value)
    } else {
        Err(ValidationError(
            "Please provide a valid 5-digit postal code".into(),
        ))
    }
}

/// Emails are compared case-insensitively, so they are stored lower-cased.
pub fn email(value: String) -> Result<String, ValidationError> {
    let value = value.to_lowercase();
    if EMAIL.is_match(&value) {
        Ok(value)
    } else {
        Err(ValidationError("Please provide a valid email address".into()))
    }
}

pub fn password(value: String) -> Result<String, ValidationError> {
    if value.chars().count() >= MIN_PASSWORD_LEN {
        Ok(value)
    } else {
        Err(ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", Some("  Ali ".into())).unwrap(), "Ali");
        assert!(required("name", Some("   ".into())).is_err());
        let err = required("purpose", None).unwrap_err();
        assert_eq!(err.to_string(), "purpose is required");
    }

    #[test]
    fn optional_collapses_blank() {
        assert_eq!(optional(Some(" ".into())), None);
        assert_eq!(optional(Some(" 54000 ".into())).as_deref(), Some("54000"));
    }

    #[test]
    fn national_id_format() {
        assert!(national_id("12345-1234567-1".into()).is_ok());
        assert!(national_id("12345-1234567-12".into()).is_err());
        assert!(national_id("1234-1234567-1".into()).is_err());
        assert!(national_id("abcde-1234567-1".into()).is_err());
    }

    #[test]
    fn phone_format() {
        for ok in ["0300-1234567", "03001234567", "+923001234567", "+92300-1234567"] {
            assert!(phone(ok.into()).is_ok(), "{ok} should be accepted");
        }
        for bad in ["300-1234567", "0300-123456", "0300 1234567", "+9203001234567"] {
            assert!(phone(bad.into()).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn postal_code_format() {
        assert!(postal_code("54000".into()).is_ok());
        assert!(postal_code("5400".into()).is_err());
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(email("Staff@Office.GOV.pk".into()).unwrap(), "staff@office.gov.pk");
        assert!(email("not-an-email".into()).is_err());
    }

    #[test]
    fn password_length() {
        assert!(password("12345".into()).is_err());
        assert!(password("123456".into()).is_ok());
    }
}
