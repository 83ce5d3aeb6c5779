use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde_json::Value as Json;

/// Current content of a form control, as reported by the host.
///
/// Text covers ordinary inputs and textareas; selects with multiple values
/// report a `List`, and composite widgets may report a `Map`. Structured
/// values stringify through JSON with sorted keys so their checksums are
/// stable across passes.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(value) => value.is_empty(),
            Self::Number(_) => false,
            Self::List(values) => values.is_empty(),
            Self::Map(values) => values.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Stable stringification used for change checksums and rule input.
    pub fn canonical(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => value.normalize().to_string(),
            Self::List(_) | Self::Map(_) => self.to_json().to_string(),
        }
    }

    fn to_json(&self) -> Json {
        match self {
            Self::Text(value) => Json::String(value.clone()),
            Self::Number(value) => Json::String(value.normalize().to_string()),
            Self::List(values) => Json::Array(values.iter().map(Self::to_json).collect()),
            Self::Map(values) => Json::Object(
                values
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_detection_per_variant() {
        assert!(FieldValue::text("").is_empty());
        assert!(!FieldValue::text("a").is_empty());
        assert!(!FieldValue::Number(Decimal::ZERO).is_empty());
        assert!(FieldValue::List(Vec::new()).is_empty());
        assert!(!FieldValue::List(vec!["x".into()]).is_empty());
    }

    #[test]
    fn canonical_text_is_verbatim() {
        assert_eq!(FieldValue::text("hello world").canonical(), "hello world");
        assert_eq!(FieldValue::text("hello world").as_str(), Some("hello world"));
        assert_eq!(FieldValue::List(Vec::new()).as_str(), None);
    }

    #[test]
    fn canonical_number_normalizes_trailing_zeros() {
        let padded = FieldValue::Number(Decimal::from_i128_with_scale(1200, 2));
        let plain = FieldValue::Number(Decimal::from_i128_with_scale(12, 0));
        assert_eq!(padded.canonical(), plain.canonical());
    }

    #[test]
    fn canonical_map_is_key_ordered() {
        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), FieldValue::text("1"));
        forward.insert("b".to_string(), FieldValue::text("2"));
        let mut reverse = BTreeMap::new();
        reverse.insert("b".to_string(), FieldValue::text("2"));
        reverse.insert("a".to_string(), FieldValue::text("1"));
        assert_eq!(
            FieldValue::Map(forward).canonical(),
            FieldValue::Map(reverse).canonical()
        );
    }

    #[test]
    fn canonical_list_preserves_order() {
        let first = FieldValue::List(vec!["a".into(), "b".into()]);
        let second = FieldValue::List(vec!["b".into(), "a".into()]);
        assert_ne!(first.canonical(), second.canonical());
    }
}
