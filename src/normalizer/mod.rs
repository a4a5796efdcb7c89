//! Field-level cleaners and the record normalizers built on them.
//!
//! Every cleaner works on loosely-typed [`serde_json::Value`] input so the same code path
//! serves HTTP bodies, import files and typed callers. Cleaners never panic; the only
//! fallible one is the unit cleaner, which rejects scalars that are not text.

mod units;
mod validate;

pub use units::{canonical_unit, UNIT_ALIASES};
pub use validate::{
    clean_into, require_name, validate_and_clean_ingredient, validate_and_clean_recipe,
    INGREDIENT_CLEANING, INGREDIENT_SWAP_CLEANING, LINK_CLEANING, QUANTITY_CHANGE_CLEANING,
    RECIPE_CLEANING, RENAME_CLEANING, SPICE_CLEANING, UNIT_CHANGE_CLEANING,
};

use log::debug;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Failure raised by a single cleaner
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// The cleaner only accepts text (or objects of text)
    #[error("expected text for {cleaner} field, found {found}")]
    NotText {
        cleaner: &'static str,
        found: &'static str,
    },

    /// A whole-record operation was handed something other than an object
    #[error("expected a JSON object, found {0}")]
    NotARecord(&'static str),
}

/// The cleaning routine applied to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCleaner {
    /// Trim and title-case
    String,
    /// Coerce to a floating-point number, `null` when unparsable
    Quantity,
    /// Map to a canonical unit abbreviation
    Unit,
    /// Trim only, preserving case (free text such as flavor descriptions)
    Text,
    /// A list of names, given as an array or a comma-separated string
    NameList,
}

/// Explicit field-name to cleaner mapping for one kind of record
pub type CleaningMap = &'static [(&'static str, FieldCleaner)];

impl FieldCleaner {
    pub fn name(&self) -> &'static str {
        match self {
            FieldCleaner::String => "string",
            FieldCleaner::Quantity => "quantity",
            FieldCleaner::Unit => "unit",
            FieldCleaner::Text => "text",
            FieldCleaner::NameList => "name list",
        }
    }

    pub fn apply(&self, value: &Value) -> Result<Value, NormalizeError> {
        match self {
            FieldCleaner::String => Ok(normalize_string(value)),
            FieldCleaner::Quantity => Ok(normalize_quantity(value)),
            FieldCleaner::Unit => normalize_unit(value),
            FieldCleaner::Text => normalize_text(value),
            FieldCleaner::NameList => normalize_name_list(value),
        }
    }
}

/// Title-case a string: a letter that follows another letter is lowercased, every other
/// letter is uppercased (so "o'neil" becomes "O'Neil").
///
/// Letters whose case mapping expands to several characters are left as they are,
/// which keeps the function idempotent.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_cased = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            let mapped = if prev_cased {
                single_char(c.to_lowercase())
            } else {
                single_char(c.to_uppercase())
            };
            out.push(mapped.unwrap_or(c));
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    match chars.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Trim and title-case a single name.
pub fn normalize_name(input: &str) -> String {
    title_case(input.trim())
}

/// Trim + title-case strings; for objects, both keys and string values.
///
/// # Example
/// ```
/// use serde_json::json;
/// use spicebox::normalizer::normalize_string;
///
/// assert_eq!(normalize_string(&json!("  panCAke mix  ")), json!("Pancake Mix"));
/// ```
pub fn normalize_string(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_name(s)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let cleaned = match v {
                        Value::String(s) => Value::String(normalize_name(s)),
                        other => other.clone(),
                    };
                    (normalize_name(k), cleaned)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Parse a quantity, tolerating surrounding whitespace. Non-finite values are rejected.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|q| q.is_finite())
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|q| q.is_finite()),
        Value::String(s) => parse_quantity(s),
        _ => None,
    }
}

fn number(q: f64) -> Value {
    Number::from_f64(q).map(Value::Number).unwrap_or(Value::Null)
}

/// Coerce to a float. Unparsable input becomes `null` instead of an error.
///
/// Objects keep their shape: keys are title-cased and each numeric-looking value is
/// converted, anything else is kept as given.
pub fn normalize_quantity(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let cleaned = coerce_f64(v).map(number).unwrap_or_else(|| v.clone());
                    (normalize_name(k), cleaned)
                })
                .collect(),
        ),
        other => coerce_f64(other).map(number).unwrap_or(Value::Null),
    }
}

/// Map a unit spelling to its canonical abbreviation.
///
/// Unmapped strings come back trimmed but otherwise untouched. Inside objects, unmapped
/// string values are title-cased instead.
pub fn normalize_unit(value: &Value) -> Result<Value, NormalizeError> {
    match value {
        Value::String(s) => Ok(Value::String(
            canonical_unit(s)
                .map(str::to_string)
                .unwrap_or_else(|| s.trim().to_string()),
        )),
        Value::Object(map) => Ok(Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let cleaned = match v {
                        Value::String(s) => Value::String(
                            canonical_unit(s)
                                .map(str::to_string)
                                .unwrap_or_else(|| normalize_name(s)),
                        ),
                        other => other.clone(),
                    };
                    (normalize_name(k), cleaned)
                })
                .collect(),
        )),
        Value::Null => Ok(Value::Null),
        other => Err(NormalizeError::NotText {
            cleaner: "unit",
            found: type_name(other),
        }),
    }
}

fn normalize_text(value: &Value) -> Result<Value, NormalizeError> {
    match value {
        Value::String(s) => Ok(Value::String(s.trim().to_string())),
        Value::Null => Ok(Value::Null),
        other => Err(NormalizeError::NotText {
            cleaner: "text",
            found: type_name(other),
        }),
    }
}

fn normalize_name_list(value: &Value) -> Result<Value, NormalizeError> {
    let names: Vec<Value> = match value {
        Value::Null => return Ok(Value::Null),
        Value::String(s) => s
            .split(',')
            .map(normalize_name)
            .filter(|name| !name.is_empty())
            .map(Value::String)
            .collect(),
        Value::Array(items) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    // names never contain commas, so an element holding one is several names
                    Value::String(s) => names.extend(
                        s.split(',')
                            .map(normalize_name)
                            .filter(|name| !name.is_empty())
                            .map(Value::String),
                    ),
                    other => {
                        return Err(NormalizeError::NotText {
                            cleaner: "name list",
                            found: type_name(other),
                        })
                    }
                }
            }
            names
        }
        other => {
            return Err(NormalizeError::NotText {
                cleaner: "name list",
                found: type_name(other),
            })
        }
    };
    Ok(Value::Array(names))
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Apply an explicit cleaning map to a record.
///
/// Only fields named in the map survive, and `null` fields are dropped. A failing
/// cleaner aborts the whole record.
pub fn apply_cleaning(record: &Value, map: CleaningMap) -> Result<Map<String, Value>, NormalizeError> {
    let fields = record
        .as_object()
        .ok_or_else(|| NormalizeError::NotARecord(type_name(record)))?;

    let mut cleaned = Map::new();
    for (key, value) in fields {
        if value.is_null() {
            continue;
        }
        if let Some((_, cleaner)) = map.iter().find(|(field, _)| field == key) {
            cleaned.insert(key.clone(), cleaner.apply(value)?);
        }
    }
    Ok(cleaned)
}

/// Keys never touched by the heuristic normalizer even though they look like names.
pub const EXCLUDED_FIELDS: &[&str] = &["username", "hostname", "email"];

/// Alias table consulted by [`guess_cleaner`], in tie-break order.
pub const FIELD_ALIASES: &[(&str, FieldCleaner)] = &[
    ("name", FieldCleaner::String),
    ("quantity", FieldCleaner::Quantity),
    ("unit", FieldCleaner::Unit),
    ("steps", FieldCleaner::String),
];

/// Guess which cleaner applies to an arbitrary field name.
///
/// An exact alias match wins outright. Otherwise the first alias (in table order) that
/// the key starts with as `alias_`, contains as `_alias`, or ends with is chosen, so
/// `unit_name` resolves to the string cleaner.
pub fn guess_cleaner(key: &str) -> Option<FieldCleaner> {
    let key = key.trim().to_lowercase();
    if EXCLUDED_FIELDS.contains(&key.as_str()) {
        return None;
    }

    if let Some((_, cleaner)) = FIELD_ALIASES.iter().find(|(alias, _)| *alias == key) {
        return Some(*cleaner);
    }

    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| {
            key.starts_with(&format!("{}_", alias))
                || key.contains(&format!("_{}", alias))
                || key.ends_with(alias)
        })
        .map(|(_, cleaner)| *cleaner)
}

fn looks_numeric(s: &str) -> bool {
    let digits = s.replacen('.', "", 1);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Normalize any input by guessing the role of each field from its name.
///
/// Objects are cleaned key by key (see [`guess_cleaner`]); when the chosen cleaner fails
/// the original value is kept. Unmatched and excluded keys pass through, and nested
/// values under them are not visited. Bare strings that look numeric become quantities,
/// other strings are title-cased, numbers become floats.
pub fn normalize_universal_input(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    let cleaned = match guess_cleaner(key) {
                        Some(cleaner) => cleaner.apply(v).unwrap_or_else(|e| {
                            debug!("keeping original value for '{}': {}", key, e);
                            v.clone()
                        }),
                        None => v.clone(),
                    };
                    (key.clone(), cleaned)
                })
                .collect(),
        ),
        Value::String(s) => {
            let stripped = s.trim();
            if looks_numeric(stripped) {
                normalize_quantity(&Value::String(stripped.to_string()))
            } else {
                normalize_string(value)
            }
        }
        Value::Number(_) => normalize_quantity(value),
        other => other.clone(),
    }
}
