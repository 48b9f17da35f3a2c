//! Synthesis orchestration and the request/response boundary.

pub mod boundary;
pub mod orchestrator;

pub use boundary::{GenerateRequest, GenerateResponse};
pub use orchestrator::{SynthesisOrchestrator, SynthesisResult};
