//! JSON encoding for sidecars and day aggregates
//!
//! Files are written as indented, strict JSON. Reading is lenient: the fast
//! path is `serde_json`; documents carrying comments or trailing commas fall
//! back to the JSON5 parser, which accepts both.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize a value as indented JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Parse a JSON document, tolerating comments and trailing commas
///
/// Unknown fields are ignored by the target types. On failure the strict
/// parser's message is returned since it carries line/column positions.
pub fn parse_lenient<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let text = text.trim_start_matches('\u{feff}');
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(strict) => json5::from_str(text).map_err(|_| strict.to_string()),
    }
}
