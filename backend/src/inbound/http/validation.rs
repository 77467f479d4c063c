//! Shared validation helpers for inbound HTTP adapters.
//!
//! Each failure becomes an `invalid_request` error whose details name the
//! offending field, the rejected value when it is safe to echo, and a stable
//! validation code.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{Error, RideStatus};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    BlankField,
    InvalidTimestamp,
    OutOfRange,
    InvalidStatus,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::BlankField => "blank_field",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::OutOfRange => "out_of_range",
            Self::InvalidStatus => "invalid_status",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ValidationCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(
    field: FieldName,
    message: String,
    code: ValidationCode,
    value: impl Into<serde_json::Value>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ValidationCode::MissingField,
    )
}

/// Require a present, non-blank string; surrounding whitespace is trimmed.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        let name = field.as_str();
        return Err(field_error(
            field,
            format!("{name} must not be blank"),
            ValidationCode::BlankField,
        ));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn parse_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let name = field.as_str();
            field_value_error(
                field,
                format!("{name} must be an RFC 3339 timestamp"),
                ValidationCode::InvalidTimestamp,
                raw,
            )
        })
}

/// Require a count of at least one that fits the domain's `u32` range.
pub(crate) fn require_positive_count(value: Option<i64>, field: FieldName) -> Result<u32, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    u32::try_from(raw)
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| {
            let name = field.as_str();
            field_value_error(
                field,
                format!("{name} must be a positive integer"),
                ValidationCode::OutOfRange,
                raw,
            )
        })
}

/// Parse an optional status filter; blank values mean "no filter".
pub(crate) fn parse_optional_status(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<RideStatus>, Error> {
    let Some(raw) = value.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|_| {
        let name = field.as_str();
        field_value_error(
            field,
            format!("{name} must be one of OPEN, FULL, COMPLETED, CANCELLED"),
            ValidationCode::InvalidStatus,
            raw,
        )
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ErrorCode;

    const ORIGIN: FieldName = FieldName::new("origin");

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn require_text_trims() {
        let value = require_text(Some("  Campus  ".to_owned()), ORIGIN).expect("valid text");
        assert_eq!(value, "Campus");
    }

    #[rstest]
    #[case(None, "missing_field")]
    #[case(Some(String::new()), "blank_field")]
    #[case(Some("   ".to_owned()), "blank_field")]
    fn require_text_rejects(#[case] value: Option<String>, #[case] code: &str) {
        let error = require_text(value, ORIGIN).expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(detail(&error, "field").and_then(Value::as_str), Some("origin"));
        assert_eq!(detail(&error, "code").and_then(Value::as_str), Some(code));
    }

    #[rstest]
    fn timestamps_normalise_to_utc() {
        let parsed = parse_rfc3339_timestamp(
            Some("2026-05-04T10:00:00+02:00".to_owned()),
            FieldName::new("departureTime"),
        )
        .expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2026-05-04T08:00:00+00:00");
    }

    #[rstest]
    fn invalid_timestamp_echoes_value() {
        let error =
            parse_rfc3339_timestamp(Some("tomorrow".to_owned()), FieldName::new("departureTime"))
                .expect_err("rejected");
        assert_eq!(detail(&error, "value").and_then(Value::as_str), Some("tomorrow"));
        assert_eq!(
            detail(&error, "code").and_then(Value::as_str),
            Some("invalid_timestamp")
        );
    }

    #[rstest]
    #[case(Some(1), Ok(1))]
    #[case(Some(4), Ok(4))]
    #[case(Some(0), Err("out_of_range"))]
    #[case(Some(-2), Err("out_of_range"))]
    #[case(Some(i64::from(u32::MAX) + 1), Err("out_of_range"))]
    #[case(None, Err("missing_field"))]
    fn seat_counts(#[case] value: Option<i64>, #[case] expected: Result<u32, &str>) {
        let result = require_positive_count(value, FieldName::new("seatsTotal"));
        match expected {
            Ok(count) => assert_eq!(result.expect("accepted"), count),
            Err(code) => {
                let error = result.expect_err("rejected");
                assert_eq!(detail(&error, "code").and_then(Value::as_str), Some(code));
            }
        }
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("OPEN"), Some(RideStatus::Open))]
    #[case(Some(" FULL "), Some(RideStatus::Full))]
    fn status_filters(#[case] value: Option<&str>, #[case] expected: Option<RideStatus>) {
        let parsed = parse_optional_status(value.map(str::to_owned), FieldName::new("status"))
            .expect("accepted");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        let error = parse_optional_status(Some("BOARDING".to_owned()), FieldName::new("status"))
            .expect_err("rejected");
        assert_eq!(
            detail(&error, "code").and_then(Value::as_str),
            Some("invalid_status")
        );
    }
}
