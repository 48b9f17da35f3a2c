//! Webhook handler synthesis from captured deliveries.
//!
//! Given the ids of captured payment-provider webhook deliveries, the engine
//! fetches them from a [`SampleStore`], groups the parsed payloads by their
//! event-kind discriminant, infers one structural schema per group and renders
//! a TypeScript discriminated union with a dispatch function.
//!
//! # Pipeline
//! - [`PayloadParser`]: raw body → `(discriminant, ValueTree)`.
//! - [`SchemaInferencer`]: value trees → one [`EventGroup`] per event kind.
//! - [`CodeSynthesizer`]: event groups → TypeScript source.
//! - [`SynthesisOrchestrator`]: ids → [`SynthesisResult`], collecting per-sample
//!   problems as warnings.
//!
//! The engine holds no state between calls and never writes to the store.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod render;
pub mod runtime;

pub use crate::config::SynthesisConfig;
pub use crate::core::{
    EventGroup, FieldSchema, ObjectShape, ParsedSample, PayloadParser, PrimitiveKind,
    SchemaInferencer, SchemaNode, ValueTree,
};
pub use crate::error::{ConfigError, SampleError, SynthesisError, SynthesisWarning};
pub use crate::render::CodeSynthesizer;
pub use crate::runtime::{
    GenerateRequest, GenerateResponse, SynthesisOrchestrator, SynthesisResult,
};

/// Store port and adapters, re-exported for callers that only depend on this crate.
pub use sample_store::{
    CapturedRecord, JsonlSampleStore, MemorySampleStore, SampleStore, SampleStoreError,
};
