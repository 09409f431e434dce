//! Parsing of raw path, query and form values into domain types.
//!
//! Every rejection is an `invalid_request` error whose `details` name the
//! offending `field`, a machine-readable `code` and, when there is one, the
//! submitted `value`.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::domain::{Email, Error, Role, UserId, UserName, UserValidationError};

/// What was wrong with a field, reported as `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
    MissingField,
    InvalidUuid,
    InvalidNumber,
    InvalidRole,
    InvalidValue,
    FileTooLarge,
    UnsupportedMediaType,
}

impl Violation {
    const fn code(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidNumber => "invalid_number",
            Self::InvalidRole => "invalid_role",
            Self::InvalidValue => "invalid_value",
            Self::FileTooLarge => "file_too_large",
            Self::UnsupportedMediaType => "unsupported_media_type",
        }
    }
}

/// Client-facing name of a request field, e.g. `pgSize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

fn reject(field: FieldName, violation: Violation, message: String, value: Option<&str>) -> Error {
    let mut details = Map::new();
    details.insert("field".to_owned(), Value::from(field.as_str()));
    details.insert("code".to_owned(), Value::from(violation.code()));
    if let Some(value) = value {
        details.insert("value".to_owned(), Value::from(value));
    }
    Error::invalid_request(message).with_details(Value::Object(details))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let message = format!("missing required field: {field}");
    reject(field, Violation::MissingField, message, None)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let message = format!("{field} must be a valid UUID");
    reject(field, Violation::InvalidUuid, message, Some(value))
}

pub(crate) fn invalid_number_error(field: FieldName, value: &str) -> Error {
    let message = format!("{field} must be a positive integer");
    reject(field, Violation::InvalidNumber, message, Some(value))
}

pub(crate) fn invalid_role_error(field: FieldName, value: &str) -> Error {
    let allowed = Role::ALL.map(Role::as_str).join(", ");
    let message = format!("{field} must be one of: {allowed}");
    reject(field, Violation::InvalidRole, message, Some(value))
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, reason: impl fmt::Display) -> Error {
    reject(field, Violation::InvalidValue, reason.to_string(), Some(value))
}

pub(crate) fn file_too_large_error(field: FieldName, limit: usize) -> Error {
    let message = format!("{field} must be at most {limit} bytes");
    reject(field, Violation::FileTooLarge, message, None)
}

pub(crate) fn unsupported_media_type_error(field: FieldName, value: &str) -> Error {
    let message = format!("{field} must be an image");
    reject(field, Violation::UnsupportedMediaType, message, Some(value))
}

/// Parse a one-based pagination parameter.
///
/// Absent values fall back to `default`. Values above `max` are clamped.
/// Zero, negative and non-numeric input is rejected.
pub(crate) fn parse_positive_u32(
    raw: Option<&str>,
    field: FieldName,
    default: u32,
    max: Option<u32>,
) -> Result<u32, Error> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|value| *value >= 1)
        .ok_or_else(|| invalid_number_error(field, raw))?;
    let ceiling = u64::from(max.unwrap_or(u32::MAX));
    let clamped = value.min(ceiling);
    u32::try_from(clamped).map_err(|_| invalid_number_error(field, raw))
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    Role::from_str(value).map_err(|_| invalid_role_error(field, value))
}

pub(crate) fn parse_user_name(value: String, field: FieldName) -> Result<UserName, Error> {
    UserName::new(value.clone()).map_err(|err| invalid_value_error(field, &value, err))
}

pub(crate) fn parse_email(value: String, field: FieldName) -> Result<Email, Error> {
    Email::new(value.clone()).map_err(|err| invalid_value_error(field, &value, err))
}

pub(crate) fn parse_user_id(value: String, field: FieldName) -> Result<UserId, Error> {
    UserId::new(&value).map_err(|err| match err {
        UserValidationError::EmptyId => missing_field_error(field),
        _ => invalid_uuid_error(field, &value),
    })
}
