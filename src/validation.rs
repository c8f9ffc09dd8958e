use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use validator::ValidateEmail;

use crate::models::{PostPayload, RegisterUserRequest};

/// Column limit shared by every text field (`VARCHAR(255)` in the migrations).
pub const MAX_STRING_LEN: usize = 255;

/// ValidationErrors
///
/// Field name to human readable messages. Serialized as the `errors` object of a 422 body.
/// A `BTreeMap` keeps the field order stable in responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// required_string
///
/// Applies `required|string|max:255` and rejects NUL characters. Strings are trimmed first and an empty result
/// counts as missing, so `"   "` fails `required` like an absent key does.
/// Returns the trimmed value when every rule passes.
pub fn required_string(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&Value>,
) -> Option<String> {
    let raw = match value {
        None | Some(Value::Null) => {
            errors.add(field, format!("The {field} field is required."));
            return None;
        }
        Some(Value::String(s)) => s.trim(),
        Some(_) => {
            errors.add(field, format!("The {field} must be a string."));
            return None;
        }
    };

    if raw.is_empty() {
        errors.add(field, format!("The {field} field is required."));
        return None;
    }

    // Postgres text columns cannot store NUL.
    if raw.contains('\0') {
        errors.add(field, format!("The {field} format is invalid."));
        return None;
    }

    if raw.chars().count() > MAX_STRING_LEN {
        errors.add(
            field,
            format!("The {field} may not be greater than {MAX_STRING_LEN} characters."),
        );
        return None;
    }

    Some(raw.to_string())
}

/// Validates a create/update body and returns the clean title.
pub fn validate_post(payload: &PostPayload) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match required_string(&mut errors, "title", payload.title.as_ref()) {
        Some(title) if errors.is_empty() => Ok(title),
        _ => Err(errors),
    }
}

/// Validates a registration body. Uniqueness of the email is checked by the store.
pub fn validate_registration(
    payload: &RegisterUserRequest,
) -> Result<(String, String), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required_string(&mut errors, "name", payload.name.as_ref());
    let email = required_string(&mut errors, "email", payload.email.as_ref()).and_then(|email| {
        if email.validate_email() {
            Some(email.to_lowercase())
        } else {
            errors.add("email", "The email must be a valid email address.");
            None
        }
    });

    match (name, email) {
        (Some(name), Some(email)) if errors.is_empty() => Ok((name, email)),
        _ => Err(errors),
    }
}
