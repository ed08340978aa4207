//! Typed accessors over loose option metadata.
//!
//! Admin-configured metadata arrives as free-form JSON. Every reader here
//! returns `None` for anything it cannot interpret; none of them fail.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

pub type Metadata = Map<String, Value>;

const TRUE_WORDS: [&str; 3] = ["yes", "true", "1"];
const FALSE_WORDS: [&str; 3] = ["no", "false", "0"];

/// Reads a number from a JSON number or a numeric-looking string.
///
/// Strings are stripped of everything except digits and `.` before parsing,
/// so `"₹1,499"` reads as 1499 and `"-20"` as 20.
pub fn numeric_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            if cleaned.is_empty() { return None; }
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

pub fn boolean_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(true),
            Some(f) if f == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => {
            let word = s.trim().to_ascii_lowercase();
            if TRUE_WORDS.contains(&word.as_str()) {
                Some(true)
            } else if FALSE_WORDS.contains(&word.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

pub fn string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn read_numeric(meta: &Metadata, key: &str) -> Option<Decimal> {
    meta.get(key).and_then(numeric_value)
}

pub fn read_boolean(meta: &Metadata, key: &str) -> Option<bool> {
    meta.get(key).and_then(boolean_value)
}

pub fn read_string(meta: &Metadata, key: &str) -> Option<String> {
    meta.get(key).and_then(string_value)
}

/// First key in `keys` that yields a number.
pub fn first_numeric(meta: &Metadata, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|k| read_numeric(meta, k))
}

pub fn first_boolean(meta: &Metadata, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| read_boolean(meta, k))
}

pub fn first_string(meta: &Metadata, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| read_string(meta, k))
}
