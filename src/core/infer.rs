//! Structural schema inference over grouped payload samples.
//!
//! Samples are partitioned by discriminant in first-seen order and each group
//! is folded pairwise with [`SchemaInferencer::merge_node`]. The fold is
//! order-independent in the shape it produces:
//!
//! - same-kind primitives are left alone, differing kinds form a flattened union
//!   with at most one member per [`ShapeClass`](crate::core::schema::ShapeClass),
//! - literal sets only grow, and collapse to `string` once they exceed the
//!   threshold, so collapse is monotonic,
//! - a field is optional iff some sample in the group lacked it,
//! - array elements are folded across every element of every instance.
//!
//! Nodes nested deeper than the depth cap become `Unknown`, and the sample is
//! reported once with a warning.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::config::SynthesisConfig;
use crate::core::parser::ParsedSample;
use crate::core::schema::{FieldSchema, ObjectShape, PrimitiveKind, SchemaNode};
use crate::core::value_tree::ValueTree;
use crate::error::SynthesisWarning;

/// Merged schema for one event kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventGroup {
    pub discriminant: String,
    pub shape: ObjectShape,
    /// Samples folded into `shape`, in input order.
    pub sample_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SchemaInferencer {
    literal_threshold: usize,
    max_depth: usize,
}

impl SchemaInferencer {
    #[must_use]
    pub fn new(config: &SynthesisConfig) -> Self {
        Self::with_limits(config.literal_threshold, config.max_depth)
    }

    #[must_use]
    pub fn with_limits(literal_threshold: usize, max_depth: usize) -> Self {
        Self {
            literal_threshold,
            max_depth,
        }
    }

    pub fn merge(
        &self,
        samples: impl IntoIterator<Item = ParsedSample>,
    ) -> (Vec<EventGroup>, Vec<SynthesisWarning>) {
        let mut groups: Vec<EventGroup> = Vec::new();
        let mut index_by_discriminant: HashMap<String, usize> = HashMap::new();
        let mut warnings = Vec::new();

        for sample in samples {
            let mut truncated = false;
            let lifted = self.lift_at(&sample.tree, 0, &mut truncated);
            let SchemaNode::Object(shape) = lifted else {
                warnings.push(SynthesisWarning::new(
                    sample.sample_id,
                    "payload root is not a JSON object",
                ));
                continue;
            };
            if truncated {
                warnings.push(SynthesisWarning::new(
                    sample.sample_id.clone(),
                    format!(
                        "payload nests deeper than {} levels; deeper values were inferred as unknown",
                        self.max_depth
                    ),
                ));
            }

            match index_by_discriminant.get(&sample.discriminant) {
                Some(&index) => {
                    let group = &mut groups[index];
                    let accumulated = std::mem::take(&mut group.shape);
                    group.shape = self.merge_objects(accumulated, shape);
                    group.sample_ids.push(sample.sample_id);
                }
                None => {
                    debug!(discriminant = %sample.discriminant, "opening event group");
                    index_by_discriminant.insert(sample.discriminant.clone(), groups.len());
                    groups.push(EventGroup {
                        discriminant: sample.discriminant,
                        shape,
                        sample_ids: vec![sample.sample_id],
                    });
                }
            }
        }

        (groups, warnings)
    }

    /// Direct structural mapping of one tree, with the depth cap applied.
    #[must_use]
    pub fn lift(&self, tree: &ValueTree) -> SchemaNode {
        let mut truncated = false;
        self.lift_at(tree, 0, &mut truncated)
    }

    fn lift_at(&self, tree: &ValueTree, depth: usize, truncated: &mut bool) -> SchemaNode {
        if depth > self.max_depth {
            *truncated = true;
            return SchemaNode::Unknown;
        }

        match tree {
            ValueTree::Truncated => {
                *truncated = true;
                SchemaNode::Unknown
            }
            ValueTree::Null => SchemaNode::null(),
            ValueTree::Bool => SchemaNode::boolean(),
            ValueTree::Number(_) => SchemaNode::number(),
            ValueTree::String => SchemaNode::string(),
            ValueTree::StringLiteral(value) => {
                self.bound_literals(BTreeSet::from([value.clone()]))
            }
            ValueTree::Array(items) => {
                let element = items.iter().fold(SchemaNode::Unknown, |element, item| {
                    let lifted = self.lift_at(item, depth + 1, truncated);
                    self.merge_node(element, lifted)
                });
                SchemaNode::array(element)
            }
            ValueTree::Object(fields) => {
                let mut shape = ObjectShape::new();
                for (name, child) in fields {
                    shape.push(FieldSchema {
                        name: name.clone(),
                        node: self.lift_at(child, depth + 1, truncated),
                        optional: false,
                    });
                }
                SchemaNode::Object(shape)
            }
        }
    }

    /// Merges two schema nodes. Total over every pair of variants.
    #[must_use]
    pub fn merge_node(&self, left: SchemaNode, right: SchemaNode) -> SchemaNode {
        match (left, right) {
            (SchemaNode::Unknown, other) | (other, SchemaNode::Unknown) => other,
            (SchemaNode::Union(members), other) | (other, SchemaNode::Union(members)) => {
                self.merge_into_union(members, other)
            }
            (SchemaNode::Primitive(a), SchemaNode::Primitive(b)) if a == b => {
                SchemaNode::Primitive(a)
            }
            (SchemaNode::LiteralUnion(mut a), SchemaNode::LiteralUnion(b)) => {
                a.extend(b);
                self.bound_literals(a)
            }
            (SchemaNode::LiteralUnion(_), SchemaNode::Primitive(PrimitiveKind::String))
            | (SchemaNode::Primitive(PrimitiveKind::String), SchemaNode::LiteralUnion(_)) => {
                SchemaNode::string()
            }
            (SchemaNode::Object(a), SchemaNode::Object(b)) => {
                SchemaNode::Object(self.merge_objects(a, b))
            }
            (SchemaNode::Array(a), SchemaNode::Array(b)) => {
                SchemaNode::array(self.merge_node(*a, *b))
            }
            (a, b) => self.merge_into_union(vec![a], b),
        }
    }

    fn merge_objects(&self, left: ObjectShape, right: ObjectShape) -> ObjectShape {
        let mut remaining = right.into_fields();
        let mut merged = ObjectShape::new();

        for field in left.into_fields() {
            match remaining.iter().position(|other| other.name == field.name) {
                Some(position) => {
                    let other = remaining.remove(position);
                    merged.push(FieldSchema {
                        node: self.merge_node(field.node, other.node),
                        optional: field.optional || other.optional,
                        name: field.name,
                    });
                }
                None => merged.push(FieldSchema {
                    optional: true,
                    ..field
                }),
            }
        }

        for field in remaining {
            merged.push(FieldSchema {
                optional: true,
                ..field
            });
        }

        merged
    }

    fn merge_into_union(&self, mut members: Vec<SchemaNode>, incoming: SchemaNode) -> SchemaNode {
        let incoming = match incoming {
            SchemaNode::Union(inner) => inner,
            other => vec![other],
        };

        for node in incoming {
            if node == SchemaNode::Unknown {
                continue;
            }
            let class = node.shape_class();
            match members.iter().position(|member| member.shape_class() == class) {
                Some(position) => {
                    let existing = members.remove(position);
                    members.push(self.merge_node(existing, node));
                }
                None => members.push(node),
            }
        }

        members.sort_by_key(SchemaNode::shape_class);
        match members.len() {
            0 => SchemaNode::Unknown,
            1 => members.remove(0),
            _ => SchemaNode::Union(members),
        }
    }

    fn bound_literals(&self, values: BTreeSet<String>) -> SchemaNode {
        if values.len() > self.literal_threshold {
            SchemaNode::string()
        } else {
            SchemaNode::LiteralUnion(values)
        }
    }
}
