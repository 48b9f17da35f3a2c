use std::collections::BTreeSet;

/// Primitive JSON kinds. Integers and floats share [`PrimitiveKind::Number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Null,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

/// Inferred structural type of one position in a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Primitive(PrimitiveKind),
    /// Closed set of observed string values.
    LiteralUnion(BTreeSet<String>),
    Object(ObjectShape),
    Array(Box<SchemaNode>),
    /// Flattened; holds at most one member per [`ShapeClass`], ordered by class.
    Union(Vec<SchemaNode>),
    /// Never populated by any sample, or cut off by the depth cap.
    Unknown,
}

/// Buckets of mutually mergeable nodes. Two nodes of the same class merge
/// into one node of that class; nodes of different classes form a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeClass {
    Text,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    Unknown,
    Union,
}

impl SchemaNode {
    #[must_use]
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    #[must_use]
    pub fn number() -> Self {
        Self::Primitive(PrimitiveKind::Number)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    #[must_use]
    pub fn null() -> Self {
        Self::Primitive(PrimitiveKind::Null)
    }

    #[must_use]
    pub fn literals<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::LiteralUnion(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn array(element: SchemaNode) -> Self {
        Self::Array(Box::new(element))
    }

    /// Builds a union the way the inferencer stores one: members ordered by class.
    #[must_use]
    pub fn union(members: impl IntoIterator<Item = SchemaNode>) -> Self {
        let mut members: Vec<_> = members.into_iter().collect();
        members.sort_by_key(SchemaNode::shape_class);
        Self::Union(members)
    }

    #[must_use]
    pub fn shape_class(&self) -> ShapeClass {
        match self {
            Self::Primitive(PrimitiveKind::String) | Self::LiteralUnion(_) => ShapeClass::Text,
            Self::Primitive(PrimitiveKind::Number) => ShapeClass::Number,
            Self::Primitive(PrimitiveKind::Boolean) => ShapeClass::Boolean,
            Self::Primitive(PrimitiveKind::Null) => ShapeClass::Null,
            Self::Object(_) => ShapeClass::Object,
            Self::Array(_) => ShapeClass::Array,
            Self::Unknown => ShapeClass::Unknown,
            Self::Union(_) => ShapeClass::Union,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectShape> {
        match self {
            Self::Object(shape) => Some(shape),
            _ => None,
        }
    }
}

impl From<ObjectShape> for SchemaNode {
    fn from(shape: ObjectShape) -> Self {
        Self::Object(shape)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub node: SchemaNode,
    /// Absent from at least one observed sample.
    pub optional: bool,
}

/// Object type whose fields keep first-seen order.
///
/// Equality is structural: two shapes are equal when they hold the same
/// fields with equal nodes and optionality, in any order.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    fields: Vec<FieldSchema>,
}

impl ObjectShape {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_required(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.push(FieldSchema {
            name: name.into(),
            node,
            optional: false,
        });
        self
    }

    #[must_use]
    pub fn with_optional(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.push(FieldSchema {
            name: name.into(),
            node,
            optional: true,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Field names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replaces a field of the same name in place, or appends.
    pub(crate) fn push(&mut self, field: FieldSchema) {
        match self.fields.iter_mut().find(|existing| existing.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub(crate) fn into_fields(self) -> Vec<FieldSchema> {
        self.fields
    }
}

impl PartialEq for ObjectShape {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|field| other.field(&field.name) == Some(field))
    }
}

impl Eq for ObjectShape {}
