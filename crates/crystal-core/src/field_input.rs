//! Tagged representation of a raw submission field.
//!
//! JSON bodies and multipart forms deliver the same logical field in
//! different shapes. Both are folded into [`FieldInput`] so the normalizer
//! can match on every shape explicitly.

use serde_json::{Number, Value};

/// A non-text scalar delivered in a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Bool(bool),
    Number(Number),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A submission field before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldInput {
    /// Absent, `null`, or an empty multipart field set.
    #[default]
    Missing,
    Scalar(Scalar),
    /// Any text: JSON, double-encoded JSON, a comma list, a bare URL.
    Encoded(String),
    /// A real array: a JSON array or repeated multipart fields.
    List(Vec<Value>),
}

impl FieldInput {
    /// Folds the values of one multipart field name into a single input.
    ///
    /// One value stays text; repeated values become a list of strings.
    #[must_use]
    pub fn from_form_values(mut values: Vec<String>) -> Self {
        match values.len() {
            0 => Self::Missing,
            1 => Self::Encoded(values.remove(0)),
            _ => Self::List(values.into_iter().map(Value::String).collect()),
        }
    }

    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Plain-text view for scalar text fields such as `name` or `brand`.
    ///
    /// Lists yield their first element. Returns `None` when missing.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Scalar(scalar) => Some(scalar.to_string()),
            Self::Encoded(text) => Some(text.clone()),
            Self::List(items) => items.first().and_then(value_text),
        }
    }
}

impl From<Value> for FieldInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Encoded(s),
            Value::Array(items) => Self::List(items),
            // A lone object is read as a one-element list (a single size row).
            object @ Value::Object(_) => Self::List(vec![object]),
        }
    }
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        Self::Encoded(value.to_owned())
    }
}

impl From<bool> for FieldInput {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for FieldInput {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Number(value.into()))
    }
}

/// Text form of a scalar JSON value; `None` for null, arrays and objects.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_maps_each_json_shape() {
        assert_eq!(FieldInput::from(Value::Null), FieldInput::Missing);
        assert_eq!(
            FieldInput::from(json!(true)),
            FieldInput::Scalar(Scalar::Bool(true))
        );
        assert_eq!(FieldInput::from(json!("x")), FieldInput::Encoded("x".into()));
        assert_eq!(
            FieldInput::from(json!(["a"])),
            FieldInput::List(vec![json!("a")])
        );
        assert_eq!(
            FieldInput::from(json!({"size": "10"})),
            FieldInput::List(vec![json!({"size": "10"})])
        );
    }

    #[test]
    fn from_form_values_folds_repeats_into_list() {
        assert_eq!(FieldInput::from_form_values(vec![]), FieldInput::Missing);
        assert_eq!(
            FieldInput::from_form_values(vec!["one".into()]),
            FieldInput::Encoded("one".into())
        );
        assert_eq!(
            FieldInput::from_form_values(vec!["a".into(), "b".into()]),
            FieldInput::List(vec![json!("a"), json!("b")])
        );
    }

    #[test]
    fn as_text_stringifies_scalars() {
        assert_eq!(FieldInput::from(42_i64).as_text().as_deref(), Some("42"));
        assert_eq!(FieldInput::from(false).as_text().as_deref(), Some("false"));
        assert_eq!(FieldInput::Missing.as_text(), None);
        assert_eq!(
            FieldInput::List(vec![json!("first"), json!("second")])
                .as_text()
                .as_deref(),
            Some("first")
        );
    }
}
