use std::collections::BTreeSet;

use sample_store::CapturedRecord;
use serde::Deserialize;
use serde_json::Value;

use crate::config::SynthesisConfig;
use crate::core::value_tree::ValueTree;
use crate::error::SampleError;

/// One successfully parsed capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSample {
    pub sample_id: String,
    pub discriminant: String,
    pub tree: ValueTree,
}

/// Turns raw captured bodies into [`ValueTree`]s keyed by their event kind.
///
/// Bodies are read without a nesting limit; everything below `max_depth` is
/// replaced by [`ValueTree::Truncated`] so the inferencer can report it.
#[derive(Debug, Clone)]
pub struct PayloadParser {
    discriminant_path: Vec<String>,
    literal_fields: BTreeSet<String>,
    max_depth: usize,
}

impl PayloadParser {
    #[must_use]
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            discriminant_path: config.discriminant_segments(),
            literal_fields: config.literal_fields.iter().cloned().collect(),
            max_depth: config.max_depth,
        }
    }

    pub fn parse(&self, record: &CapturedRecord) -> Result<ParsedSample, SampleError> {
        if !record.is_json() {
            return Err(SampleError::UnsupportedContentType {
                sample_id: record.id.clone(),
                content_type: record.content_type.clone().unwrap_or_default(),
            });
        }

        self.parse_body(&record.id, &record.body)
    }

    /// Parses a bare body. Content type is not consulted.
    pub fn parse_body(&self, sample_id: &str, body: &str) -> Result<ParsedSample, SampleError> {
        let value = read_unbounded(body).map_err(|source| SampleError::Parse {
            sample_id: sample_id.to_string(),
            reason: source.to_string(),
        })?;

        let discriminant = self.discriminant(&value).map(str::to_string);
        let tree = self.build(&value, Some(self.discriminant_path.as_slice()), false, 0);
        release(value);

        let discriminant = discriminant.ok_or_else(|| SampleError::MissingDiscriminant {
            sample_id: sample_id.to_string(),
            path: self.discriminant_path.join("."),
        })?;

        Ok(ParsedSample {
            sample_id: sample_id.to_string(),
            discriminant,
            tree,
        })
    }

    fn discriminant<'a>(&self, value: &'a Value) -> Option<&'a str> {
        let mut current = value;
        for segment in &self.discriminant_path {
            current = current.as_object()?.get(segment)?;
        }
        current.as_str()
    }

    /// `discriminant_rest` is the remaining discriminant path below `value`, if
    /// `value` lies on that path. `literal` marks values of a configured literal field.
    fn build(
        &self,
        value: &Value,
        discriminant_rest: Option<&[String]>,
        literal: bool,
        depth: usize,
    ) -> ValueTree {
        if depth > self.max_depth {
            return ValueTree::Truncated;
        }

        match value {
            Value::String(text) if literal || matches!(discriminant_rest, Some([])) => {
                ValueTree::StringLiteral(text.clone())
            }
            Value::Array(items) => ValueTree::Array(
                items
                    .iter()
                    .map(|item| self.build(item, None, false, depth + 1))
                    .collect(),
            ),
            Value::Object(map) => ValueTree::Object(
                map.iter()
                    .map(|(key, child)| {
                        let rest = discriminant_rest.and_then(|rest| match rest.split_first() {
                            Some((head, tail)) if head == key => Some(tail),
                            _ => None,
                        });
                        let literal = self.literal_fields.contains(key);
                        (key.clone(), self.build(child, rest, literal, depth + 1))
                    })
                    .collect(),
            ),
            other => ValueTree::from_json(other),
        }
    }
}

/// Reads a JSON document of any nesting depth, growing the stack on demand.
fn read_unbounded(body: &str) -> Result<Value, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Drops a document iteratively; a recursive drop of a deep body would overflow the stack.
fn release(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, child)| child)),
            _ => {}
        }
    }
}
