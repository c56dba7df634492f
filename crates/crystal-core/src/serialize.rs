//! Text encoding for list columns.
//!
//! Columns hold exactly one level of JSON array syntax. Only typed, already
//! normalized sequences are accepted, so a serialized value can never be
//! wrapped in quotes a second time.

use serde::Serialize;

use crate::field_input::FieldInput;
use crate::normalize::{normalize_images, normalize_key_features, normalize_sizes};
use crate::products::SizeEntry;

const EMPTY_LIST: &str = "[]";

/// Encodes a canonical sequence as single-level JSON array text.
#[must_use]
pub fn serialize_list<T: Serialize>(items: &[T]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| EMPTY_LIST.to_owned())
}

/// Canonical column text for a stored `sizes` value.
#[must_use]
pub fn canonical_sizes_text(raw: Option<&str>) -> String {
    serialize_list::<SizeEntry>(&normalize_sizes(&column_input(raw)))
}

/// Canonical column text for a stored `images` value.
#[must_use]
pub fn canonical_images_text(raw: Option<&str>) -> String {
    serialize_list(&normalize_images(&column_input(raw)))
}

/// Canonical column text for a stored `key_features` value.
#[must_use]
pub fn canonical_key_features_text(raw: Option<&str>) -> String {
    serialize_list(&normalize_key_features(&column_input(raw)))
}

/// Wraps a nullable text column as normalizer input.
#[must_use]
pub fn column_input(raw: Option<&str>) -> FieldInput {
    raw.map_or(FieldInput::Missing, FieldInput::from)
}
