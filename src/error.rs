//! Error taxonomy.
//!
//! Per-sample problems ([`SampleError`]) never abort a batch; they surface as
//! [`SynthesisWarning`]s next to the rendered artifact. Request-level problems
//! ([`SynthesisError`]) abort before any inference runs and yield no artifact.

use std::fmt;

use sample_store::SampleStoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why one selected sample was left out of inference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("sample was not found in the capture store")]
    NotFound { sample_id: String },

    #[error("sample could not be read from the capture store: {reason}")]
    Store { sample_id: String, reason: String },

    #[error("body is declared as '{content_type}', not JSON")]
    UnsupportedContentType {
        sample_id: String,
        content_type: String,
    },

    #[error("body is not valid JSON: {reason}")]
    Parse { sample_id: String, reason: String },

    #[error("discriminant field '{path}' is missing or not a string")]
    MissingDiscriminant { sample_id: String, path: String },
}

impl SampleError {
    #[must_use]
    pub fn from_store(sample_id: impl Into<String>, error: SampleStoreError) -> Self {
        let sample_id = sample_id.into();
        if error.is_not_found() {
            Self::NotFound { sample_id }
        } else {
            Self::Store {
                sample_id,
                reason: error.to_string(),
            }
        }
    }

    #[must_use]
    pub fn sample_id(&self) -> &str {
        match self {
            Self::NotFound { sample_id }
            | Self::Store { sample_id, .. }
            | Self::UnsupportedContentType { sample_id, .. }
            | Self::Parse { sample_id, .. }
            | Self::MissingDiscriminant { sample_id, .. } => sample_id,
        }
    }
}

/// A recoverable per-sample problem reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisWarning {
    pub sample_id: String,
    pub reason: String,
}

impl SynthesisWarning {
    #[must_use]
    pub fn new(sample_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            reason: reason.into(),
        }
    }
}

impl From<SampleError> for SynthesisWarning {
    fn from(error: SampleError) -> Self {
        Self::new(error.sample_id(), error.to_string())
    }
}

impl fmt::Display for SynthesisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sample_id, self.reason)
    }
}

/// Terminal failure of a synthesis request. No artifact is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("no samples were selected")]
    EmptySelection,

    #[error("none of the {selected} selected samples could be used for inference")]
    NoValidSamples {
        selected: usize,
        warnings: Vec<SynthesisWarning>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidInteger { key: &'static str, value: String },

    #[error("discriminant path '{path}' contains an empty segment")]
    InvalidDiscriminantPath { path: String },

    #[error("max depth {max_depth} would cut off discriminant path '{path}'")]
    DepthBelowDiscriminant { max_depth: usize, path: String },

    #[error("fetch concurrency must be at least 1")]
    ZeroConcurrency,
}
