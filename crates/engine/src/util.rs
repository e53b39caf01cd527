//! Internal helpers for model validation and conversion.
//!
//! Not part of the public API.

use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
        .map_err(|_| EngineError::InvalidCurrency(format!("invalid currency: {value}")))
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
