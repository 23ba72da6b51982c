//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Minimum length (in characters, after trimming) of names and descriptions.
pub(crate) const MIN_NAME_LEN: usize = 2;

/// Trim `value` and reject it when shorter than [`MIN_NAME_LEN`].
pub(crate) fn validate_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(EngineError::InvalidName(format!(
            "{label} name must have at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free text, mapping blank to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Lookup key for names: accents stripped, lowercased, trimmed.
///
/// `"  José "` and `"jose"` share the key `"jose"`.
pub(crate) fn name_key(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}
