use serde_json::{Number, Value};

/// Parsed shape of one payload.
///
/// Only the discriminant and configured literal fields keep their string
/// values; every other string is reduced to its kind. Numbers keep the exact
/// literal the provider sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTree {
    Null,
    Bool,
    Number(Number),
    String,
    StringLiteral(String),
    Array(Vec<ValueTree>),
    /// Fields in the order they appear in the payload.
    Object(Vec<(String, ValueTree)>),
    /// Stands in for a value nested below the depth cap.
    Truncated,
}

impl ValueTree {
    /// Plain structural mapping of a JSON value, with no literal tracking.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(number) => Self::Number(number.clone()),
            Value::String(_) => Self::String,
            Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), Self::from_json(child)))
                    .collect(),
            ),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ValueTree> {
        match self {
            Self::Object(fields) => fields
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, child)| child),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }
}
