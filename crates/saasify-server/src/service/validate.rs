//! Input validation shared by the services.
//!
//! Request bodies derive [`Validate`]; problems are collected per field and
//! nothing is written unless the whole input is valid.

use std::borrow::Cow;

use saasify_core::error::{FieldErrors, SaasifyError, SaasifyResult};
use validator::{Validate, ValidationError, ValidationErrors};

pub const SLUG_MIN: usize = 2;
pub const SLUG_MAX: usize = 48;

/// Run the derived rules on `input`, mapping failures onto
/// [`SaasifyError::Validation`].
pub fn validate_input<T: Validate>(input: &T) -> SaasifyResult<()> {
    input.validate().map_err(|errors| SaasifyError::Validation {
        message: "Invalid input".into(),
        field_errors: field_errors(&errors),
    })
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, problems)| {
            let messages = problems
                .iter()
                .map(|problem| match &problem.message {
                    Some(message) => message.to_string(),
                    None => problem.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Trim surrounding whitespace, in place.
pub fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Slugs are compared and stored lowercased.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Accepts a normalized slug of 2 to 48 characters from `[a-z0-9-]` that
/// neither starts nor ends with `-`.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_len = (SLUG_MIN..=SLUG_MAX).contains(&slug.len());
    if valid_chars && valid_len && !slug.starts_with('-') && !slug.ends_with('-') {
        Ok(())
    } else {
        Err(invalid(
            "slug",
            "Use 2-48 lowercase letters, digits or hyphens, not starting or ending with a hyphen",
        ))
    }
}

pub fn validate_object(value: &serde_json::Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(invalid("object", "Must be an object"))
    }
}
