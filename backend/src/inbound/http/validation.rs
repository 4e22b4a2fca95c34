//! Request field checks shared by the handlers.
//!
//! A missing field is answered with `400` and
//! `details: {"field": <name>, "code": "missing_field"}` so forms can point
//! at the offending input.

use serde_json::json;

use crate::domain::Error;

const MISSING_FIELD: &str = "missing_field";

/// Wire name of a request field, as the client spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

pub(crate) fn missing_field_error(FieldName(field): FieldName) -> Error {
    Error::invalid_request(format!("missing required field: {field}"))
        .with_details(json!({ "field": field, "code": MISSING_FIELD }))
}

/// Require a present, non-blank value; returns it trimmed.
pub(crate) fn require_field(value: Option<String>, field: FieldName) -> Result<String, Error> {
    match value.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_owned()),
        _ => Err(missing_field_error(field)),
    }
}
