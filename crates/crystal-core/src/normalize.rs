//! Normalization of list-valued product fields and the `featured` flag.
//!
//! Stored rows and incoming submissions carry `sizes`, `images` and
//! `key_features` in many shapes: real arrays, JSON text, JSON text wrapped
//! in another JSON string after repeated save/load cycles, text littered
//! with escape backslashes, or a plain comma list. Every function here is
//! total: unusable input degrades to an empty list instead of an error, so
//! malformed historical data never blocks a read or an update.

use serde_json::Value;

use crate::field_input::{value_text, FieldInput, Scalar};
use crate::products::SizeEntry;

/// How many levels of accidental re-encoding [`decode_list`] will peel.
pub const MAX_UNWRAP_DEPTH: usize = 2;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Normalizes a `sizes` field into size rows.
///
/// Non-object elements are dropped, as are rows with no size, no packing
/// and no gauge. Text that does not decode to a JSON array yields an empty
/// list: size rows cannot be rebuilt from free text.
#[must_use]
pub fn normalize_sizes(input: &FieldInput) -> Vec<SizeEntry> {
    let items = match input {
        FieldInput::Missing | FieldInput::Scalar(_) => return Vec::new(),
        FieldInput::Encoded(text) => decode_list(text).unwrap_or_default(),
        FieldInput::List(items) => items.clone(),
    };

    items.iter().filter_map(size_entry).collect()
}

/// Normalizes an `images` field into a list of URL strings.
///
/// URL validity is not checked here; [`merge_images`] applies that filter
/// on write. A bare string is kept only when it is itself an http(s) URL.
#[must_use]
pub fn normalize_images(input: &FieldInput) -> Vec<String> {
    match input {
        FieldInput::Missing | FieldInput::Scalar(_) => Vec::new(),
        FieldInput::Encoded(text) => {
            let trimmed = text.trim();
            if looks_encoded(trimmed) {
                if let Some(items) = decode_list(trimmed) {
                    return string_items(&items);
                }
            }
            if is_public_image_url(trimmed) {
                vec![trimmed.to_owned()]
            } else {
                Vec::new()
            }
        }
        // Repeated multipart fields may each carry an encoded list.
        FieldInput::List(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::String(s) if looks_encoded(s.trim()) => decode_list(s)
                    .map(|inner| string_items(&inner))
                    .unwrap_or_default(),
                Value::String(s) => non_empty(s).into_iter().collect(),
                _ => Vec::new(),
            })
            .collect(),
    }
}

/// Normalizes a `key_features` field into trimmed, non-empty strings.
///
/// Text that is not a JSON array is read as a comma-separated list.
/// Duplicates are preserved.
#[must_use]
pub fn normalize_key_features(input: &FieldInput) -> Vec<String> {
    match input {
        FieldInput::Missing => Vec::new(),
        FieldInput::Scalar(scalar) => vec![scalar.to_string()],
        FieldInput::Encoded(text) => {
            let trimmed = text.trim();
            if looks_encoded(trimmed) {
                if let Some(items) = decode_list(trimmed) {
                    return string_items(&items);
                }
            }
            trimmed.split(',').filter_map(non_empty).collect()
        }
        FieldInput::List(items) => string_items(items),
    }
}

/// Coerces a heterogeneous flag value to a strict boolean.
///
/// Truthy forms are boolean `true`, the number `1`, and the strings
/// `"true"` / `"1"` (surrounding whitespace ignored). Lists use their first
/// element. Everything else, including a missing field, is `false`.
#[must_use]
pub fn coerce_flag(input: &FieldInput) -> bool {
    match input {
        FieldInput::Missing => false,
        FieldInput::Scalar(Scalar::Bool(b)) => *b,
        FieldInput::Scalar(Scalar::Number(n)) => n
            .as_f64()
            .is_some_and(|value| (value - 1.0).abs() < f64::EPSILON),
        FieldInput::Encoded(text) => matches!(text.trim(), "true" | "1"),
        FieldInput::List(items) => items
            .first()
            .is_some_and(|first| coerce_flag(&FieldInput::from(first.clone()))),
    }
}

/// Builds the final image list for a write: kept images first, then the
/// URLs of newly uploaded files, each filtered to absolute http(s) URLs.
#[must_use]
pub fn merge_images<K, U>(kept: K, uploaded: U) -> Vec<String>
where
    K: IntoIterator<Item = String>,
    U: IntoIterator<Item = String>,
{
    kept.into_iter()
        .chain(uploaded)
        .filter_map(|url| {
            let trimmed = url.trim();
            is_public_image_url(trimmed).then(|| trimmed.to_owned())
        })
        .collect()
}

/// Returns `true` for an absolute `http://` or `https://` URL with a host.
#[must_use]
pub fn is_public_image_url(candidate: &str) -> bool {
    let rest = candidate
        .strip_prefix("https://")
        .or_else(|| candidate.strip_prefix("http://"));

    rest.is_some_and(|rest| {
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        !host.is_empty() && !rest.chars().any(char::is_whitespace)
    })
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes text holding a JSON array, peeling accidental re-encoding.
///
/// Each level parses the candidate (retrying once with backslashes
/// stripped). A JSON string whose content is an array, a one-element array
/// whose only element is an encoded array, and the unescaped legacy shape
/// `["[...]"]` all unwrap to their inner text. An element that merely starts
/// with `[` but does not decode to an array is ordinary data, so the outer
/// array is kept. At most [`MAX_UNWRAP_DEPTH`] unwraps happen before giving
/// up.
pub(crate) fn decode_list(raw: &str) -> Option<Vec<Value>> {
    match decode_level(raw.trim(), MAX_UNWRAP_DEPTH) {
        Decoded::List(items) => Some(items),
        Decoded::NotList | Decoded::TooDeep => None,
    }
}

enum Decoded {
    List(Vec<Value>),
    NotList,
    TooDeep,
}

fn decode_level(text: &str, depth: usize) -> Decoded {
    match parse_json(text) {
        Some(Value::Array(items)) => match nested_encoded_list(&items) {
            Some(inner) => match unwrap_inner(inner, depth) {
                Decoded::NotList => Decoded::List(items),
                decoded => decoded,
            },
            None => Decoded::List(items),
        },
        Some(Value::String(inner)) if inner.trim_start().starts_with('[') => {
            unwrap_inner(&inner, depth)
        }
        Some(_) => Decoded::NotList,
        None => {
            peel_quoted_list(text).map_or(Decoded::NotList, |inner| unwrap_inner(inner, depth))
        }
    }
}

fn unwrap_inner(inner: &str, depth: usize) -> Decoded {
    let inner = inner.trim();
    match depth.checked_sub(1) {
        Some(next) => decode_level(inner, next),
        None if encodes_list(inner) => Decoded::TooDeep,
        None => Decoded::NotList,
    }
}

/// Shallow check used once the unwrap budget is spent.
fn encodes_list(text: &str) -> bool {
    match parse_json(text) {
        Some(Value::Array(_)) => true,
        Some(Value::String(inner)) => inner.trim_start().starts_with('['),
        Some(_) => false,
        None => peel_quoted_list(text).is_some(),
    }
}

fn parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok().or_else(|| {
        text.contains('\\')
            .then(|| text.replace('\\', ""))
            .and_then(|stripped| serde_json::from_str(&stripped).ok())
    })
}

/// `["[...]"]`: a one-element array whose element may be an encoded array.
fn nested_encoded_list(items: &[Value]) -> Option<&str> {
    match items {
        [Value::String(inner)] if inner.trim_start().starts_with('[') => Some(inner.as_str()),
        _ => None,
    }
}

/// Peels the unparseable legacy wrapper `["` ... `"]` around an array.
fn peel_quoted_list(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("[\"")?.strip_suffix("\"]")?.trim();
    inner.starts_with('[').then_some(inner)
}

fn looks_encoded(text: &str) -> bool {
    text.starts_with('[') || (text.len() > 1 && text.starts_with('"') && text.ends_with('"'))
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(value_text)
        .filter_map(|text| non_empty(&text))
        .collect()
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn size_entry(value: &Value) -> Option<SizeEntry> {
    let Value::Object(map) = value else {
        return None;
    };

    let mut entry = SizeEntry {
        size: map.get("size").and_then(value_text).unwrap_or_default(),
        packing: map.get("packing").and_then(value_text).unwrap_or_default(),
        gauge: Vec::new(),
    };

    let tokens = match map.get("gauge") {
        Some(Value::Array(tokens)) => string_items(tokens),
        Some(Value::String(text)) => normalize_key_features(&FieldInput::Encoded(text.clone())),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => {
            value_text(scalar).into_iter().collect()
        }
        _ => Vec::new(),
    };
    for token in &tokens {
        entry.add_gauge(token);
    }

    let blank =
        entry.size.trim().is_empty() && entry.packing.trim().is_empty() && entry.gauge.is_empty();
    (!blank).then_some(entry)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
