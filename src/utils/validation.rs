use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;

/// Runs the payload's `validator` rules, reporting every failing field.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(|err| AppError::Validation(validation_message(&err)))
}

/// `"Validation Error: email is not a valid email, name is required"`, with
/// fields in alphabetical order.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let details = fields
        .iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| format!("{} {}", field, describe(e))))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Validation Error: {}", details)
}

pub fn field_error(field: &str, reason: &str) -> AppError {
    AppError::Validation(format!("Validation Error: {} {}", field, reason))
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "required" => "is required".to_string(),
        "email" => "is not a valid email".to_string(),
        "length" => match error.params.get("min") {
            Some(min) => format!("must be at least {} characters", min),
            None => "has an invalid length".to_string(),
        },
        "range" => "must be a positive integer".to_string(),
        other => format!("is invalid ({})", other),
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the UTC
/// calendar date of the latter.
pub fn parse_hire_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

pub fn validate_hire_date(value: &str) -> Result<(), ValidationError> {
    if parse_hire_date(value).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("date");
    err.message = Some(Cow::from("is an invalid date (expected YYYY-MM-DD)"));
    Err(err)
}

/// Path identifiers must be plain decimal digits that fit an `i64`.
pub fn parse_employee_id(raw: &str) -> Result<i64, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(field_error("id", "must be a number"));
    }
    raw.parse::<i64>().map_err(|_| field_error("id", "is out of range"))
}
