//! Input validation rules
//!
//! Request DTOs derive [`validator::Validate`] and point their string fields
//! at the functions below through `#[validate(custom(function = "..."))]`.
//! Before validation every DTO is passed through [`Normalize::normalize`],
//! which trims strings and turns blank optional strings into `None`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

/// Letters separated by single spaces (names, titles, subjects)
static WORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+( [A-Za-z]+)*$").expect("valid regex"));

/// Content keys: letters, digits, `_` and `-`
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+$").expect("valid regex"));

/// Optional `+<country> ` prefix followed by 10 to 15 digits
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+\d+\s)?\d{10,15}$").expect("valid regex"));

pub const MIN_TEXT_LEN: usize = 2;
pub const MAX_TEXT_LEN: usize = 50;
/// Email template titles and subjects
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 50;
/// CMS page content and email template bodies (HTML)
pub const MAX_BODY_LEN: usize = 65_535;

/// Explicit input normalization applied to request DTOs before validation
pub trait Normalize {
    fn normalize(&mut self);
}

/// Trim a required string in place
pub fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional string in place, blank becomes `None`
pub fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        trim(v);
        if v.is_empty() {
            *value = None;
        }
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// 2 to 50 letters, single spaces between words
pub fn validate_words(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len) {
        return Err(error("length", "must be between 2 and 50 characters."));
    }
    if !WORDS_RE.is_match(value) {
        return Err(error(
            "words",
            "can only contain letters and single spaces between words.",
        ));
    }
    Ok(())
}

/// Free text of 2 to 50 characters without double spaces (role descriptions)
pub fn validate_description(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len) {
        return Err(error("length", "must be between 2 and 50 characters."));
    }
    if value.contains("  ") {
        return Err(error("spaces", "cannot contain consecutive spaces."));
    }
    Ok(())
}

/// Free text of 2 to 200 characters (email template titles and subjects)
pub fn validate_title(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if !(MIN_TEXT_LEN..=MAX_TITLE_LEN).contains(&len) {
        return Err(error("length", "must be between 2 and 200 characters."));
    }
    if value.contains("  ") {
        return Err(error("spaces", "cannot contain consecutive spaces."));
    }
    Ok(())
}

pub fn validate_key(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len) {
        return Err(error("length", "must be between 2 and 50 characters."));
    }
    if !KEY_RE.is_match(value) {
        return Err(error(
            "key",
            "can only contain letters, numbers, underscores '_' and hyphens '-' with no spaces.",
        ));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if char_len(value) > MAX_EMAIL_LEN || !EMAIL_RE.is_match(value) {
        return Err(error("email", "Invalid email format."));
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !PHONE_RE.is_match(value) {
        return Err(error("phone", "Invalid phone number."));
    }
    Ok(())
}

/// 8 to 50 characters with at least one uppercase letter, one digit and one
/// special character
pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    let strong = (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len)
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| !c.is_alphanumeric());
    if !strong {
        return Err(error(
            "password",
            "Password must be 8-50 characters and include an uppercase letter, a number and a special character.",
        ));
    }
    Ok(())
}

/// HTML body of a CMS page or email template
pub fn validate_body(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if !(MIN_TEXT_LEN..=MAX_BODY_LEN).contains(&len) {
        return Err(error("length", "must be at least 2 characters."));
    }
    Ok(())
}
