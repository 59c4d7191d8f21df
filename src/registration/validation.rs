//! Field validators for the sign-up form.
//!
//! Every validator is a pure function of one raw field value. The
//! password/confirmation equality check depends on two fields and therefore
//! only exists at form level, in [`FormValidationResult`].

use crate::registration::form::{Field, RegistrationForm};
use std::collections::BTreeMap;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 12;

/// Characters accepted by the special-character rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ValidationResult::Invalid(reason.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(reason) => Some(reason),
        }
    }
}

fn require_present(value: &str, reason: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::invalid(reason)
    } else {
        ValidationResult::Valid
    }
}

pub fn validate_first_name(value: &str) -> ValidationResult {
    require_present(value, "First name is required.")
}

pub fn validate_last_name(value: &str) -> ValidationResult {
    require_present(value, "Last name is required.")
}

/// Presence only. Address syntax is left to the identity provider, which
/// rejects malformed addresses itself.
pub fn validate_email(value: &str) -> ValidationResult {
    require_present(value, "Email is required.")
}

/// Always valid on its own; equality with the password is checked per form.
pub fn validate_confirm_password(_value: &str) -> ValidationResult {
    ValidationResult::Valid
}

type PasswordRule = (fn(&str) -> bool, &'static str);

// Evaluated in order; the first failing rule is reported.
const PASSWORD_POLICY: [PasswordRule; 6] = [
    (is_present, "Password is required."),
    (is_long_enough, "Password must be at least 12 characters."),
    (has_uppercase, "Must contain 1 uppercase letter."),
    (has_lowercase, "Must contain 1 lowercase letter."),
    (has_digit, "Must contain 1 number."),
    (has_special, "Must contain 1 special character."),
];

fn is_present(value: &str) -> bool {
    !value.is_empty()
}

fn is_long_enough(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LEN
}

fn has_uppercase(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_uppercase())
}

fn has_lowercase(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

fn has_special(value: &str) -> bool {
    value.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

pub fn validate_password(value: &str) -> ValidationResult {
    PASSWORD_POLICY
        .iter()
        .find(|(check, _)| !check(value))
        .map_or(ValidationResult::Valid, |(_, reason)| {
            ValidationResult::invalid(*reason)
        })
}

pub fn validate_field(field: Field, value: &str) -> ValidationResult {
    match field {
        Field::FirstName => validate_first_name(value),
        Field::LastName => validate_last_name(value),
        Field::Email => validate_email(value),
        Field::Password => validate_password(value),
        Field::ConfirmPassword => validate_confirm_password(value),
    }
}

/// Per-field outcomes for one form snapshot plus the cross-field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidationResult {
    // Indexed by `Field` discriminant, which follows `Field::ALL`.
    fields: [ValidationResult; 5],
    passwords_match: bool,
}

impl FormValidationResult {
    pub fn validate(form: &RegistrationForm) -> Self {
        let fields = Field::ALL.map(|field| validate_field(field, form.value(field)));

        Self {
            fields,
            passwords_match: form.password == form.confirm_password,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.passwords_match && self.fields.iter().all(ValidationResult::is_valid)
    }

    pub fn passwords_match(&self) -> bool {
        self.passwords_match
    }

    pub fn field(&self, field: Field) -> &ValidationResult {
        &self.fields[field as usize]
    }

    fn outcomes(&self) -> impl Iterator<Item = (Field, &ValidationResult)> {
        Field::ALL.into_iter().zip(&self.fields)
    }

    /// Field name to reason, ready for inline display. A password mismatch
    /// is reported against the confirmation field.
    pub fn rejections(&self) -> BTreeMap<Field, String> {
        let mut errors: BTreeMap<Field, String> = self
            .outcomes()
            .filter_map(|(field, result)| result.reason().map(|r| (field, r.to_string())))
            .collect();

        if !self.passwords_match {
            errors
                .entry(Field::ConfirmPassword)
                .or_insert_with(|| PASSWORD_MISMATCH.to_string());
        }
        errors
    }

    /// First rejection in form order; the mismatch comes after all fields.
    pub fn first_rejection(&self) -> Option<(Field, &str)> {
        self.outcomes()
            .find_map(|(field, result)| result.reason().map(|r| (field, r)))
            .or_else(|| (!self.passwords_match).then_some((Field::ConfirmPassword, PASSWORD_MISMATCH)))
    }

    pub fn into_rejection(self) -> Option<ValidationRejection> {
        let (field, message) = self.first_rejection()?;
        Some(ValidationRejection {
            field,
            message: message.to_string(),
            errors: self.rejections(),
        })
    }
}

/// A form that failed local validation. No remote call was made for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationRejection {
    pub field: Field,
    pub message: String,
    pub errors: BTreeMap<Field, String>,
}
