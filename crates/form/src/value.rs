//! Field values and empty-field normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a single form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value
    #[default]
    Null,
    Flag(bool),
    Number(i64),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Whether the value counts as "not filled in"
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(FieldValue::is_empty),
            FieldValue::Flag(_) | FieldValue::Number(_) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Flag(true) => write!(f, "yes"),
            FieldValue::Flag(false) => write!(f, "no"),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// Collapse every "empty" representation to [`FieldValue::Null`].
///
/// Blank text and lists with no filled-in element become `Null`; lists keep
/// their non-empty elements in order.
pub fn normalize(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(text) if text.trim().is_empty() => FieldValue::Null,
        FieldValue::List(items) => {
            let items: Vec<_> = items
                .iter()
                .map(normalize)
                .filter(|item| *item != FieldValue::Null)
                .collect();
            if items.is_empty() {
                FieldValue::Null
            } else {
                FieldValue::List(items)
            }
        }
        other => other.clone(),
    }
}

/// Equality after normalization.
pub fn values_equal(a: &FieldValue, b: &FieldValue) -> bool {
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_null() {
        assert_eq!(normalize(&FieldValue::text("")), FieldValue::Null);
        assert_eq!(normalize(&FieldValue::text("   ")), FieldValue::Null);
        assert_eq!(normalize(&FieldValue::text(" x ")), FieldValue::text(" x "));
    }

    #[test]
    fn test_lists_drop_empty_items() {
        let list = FieldValue::List(vec![
            FieldValue::text(""),
            FieldValue::Number(3),
            FieldValue::Null,
        ]);
        assert_eq!(normalize(&list), FieldValue::List(vec![FieldValue::Number(3)]));
        assert_eq!(normalize(&FieldValue::List(vec![])), FieldValue::Null);
    }

    #[test]
    fn test_values_equal_ignores_empty_representation() {
        assert!(values_equal(&FieldValue::Null, &FieldValue::text("")));
        assert!(values_equal(&FieldValue::List(vec![]), &FieldValue::Null));
        assert!(!values_equal(&FieldValue::Flag(false), &FieldValue::Null));
        assert!(!values_equal(&FieldValue::Number(0), &FieldValue::Null));
    }

    #[test]
    fn test_display() {
        let list = FieldValue::List(vec![FieldValue::text("a"), FieldValue::Number(2)]);
        assert_eq!(list.to_string(), "a, 2");
        assert_eq!(FieldValue::Flag(true).to_string(), "yes");
        assert_eq!(FieldValue::Null.to_string(), "");
    }
}
