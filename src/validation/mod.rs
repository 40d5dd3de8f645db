//! Field-level validation shared by every request payload.
//!
//! Rules are declared on the request types with `#[derive(Validate)]`; this
//! module holds the custom rule functions those declarations reference and
//! converts `validator`'s error map into the ordered [`FieldErrors`] list the
//! API returns.

use std::{borrow::Cow, fmt};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every violation found in one payload, sorted by field then message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(mut errors: Vec<FieldError>) -> Self {
        errors.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
        Self(errors)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter()
                    .map(move |e| FieldError::new(field.clone(), describe(e)))
            })
            .collect::<Vec<_>>()
            .into()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => error.code.to_string(),
    }
}

/// Runs the declared rules of `payload`, collecting every violation.
pub fn validate<T: Validate>(payload: &T) -> Result<(), FieldErrors> {
    payload.validate().map_err(FieldErrors::from)
}

/// Unwraps a field whose presence a `required` rule has already checked.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, FieldErrors> {
    value.ok_or_else(|| FieldErrors::from(vec![FieldError::new(field, "is required")]))
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("blank", "must not be blank"));
    }
    Ok(())
}

/// Prices are stored as `NUMERIC(12, 2)`: at most 10 integer and 2 fractional digits.
pub const PRICE_SCALE: u32 = 2;
pub const PRICE_INTEGER_DIGITS: u32 = 10;

pub fn valid_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(rule_error("not_positive", "must be greater than zero"));
    }

    if value.normalize().scale() > PRICE_SCALE {
        return Err(rule_error("scale", "must have at most 2 decimal places"));
    }

    if value.trunc() >= Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(rule_error("too_large", "must have at most 10 integer digits"));
    }

    Ok(())
}

pub fn not_nil(value: &Uuid) -> Result<(), ValidationError> {
    if value.is_nil() {
        return Err(rule_error("nil", "must not be empty"));
    }
    Ok(())
}
