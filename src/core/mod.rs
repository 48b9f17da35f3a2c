//! Parsing and structural inference.

pub mod infer;
pub mod parser;
pub mod schema;
pub mod value_tree;

pub use infer::{EventGroup, SchemaInferencer};
pub use parser::{ParsedSample, PayloadParser};
pub use schema::{FieldSchema, ObjectShape, PrimitiveKind, SchemaNode, ShapeClass};
pub use value_tree::ValueTree;
