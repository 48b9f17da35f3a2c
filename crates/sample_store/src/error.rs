use std::path::PathBuf;

use thiserror::Error;

/// Problem with a single captured record, independent of where it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record id must not be empty")]
    EmptyId,

    #[error("header '{name}' appears more than once (header names are case-insensitive)")]
    DuplicateHeader { name: String },

    #[error("invalid RFC3339 timestamp in field 'createdAt': {value}")]
    InvalidTimestamp { value: String },
}

#[derive(Debug, Error)]
pub enum SampleStoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while reading line {line} in {path}: {source}")]
    IoLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse captured record at {path}:{line}: {source}")]
    JsonLineParse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line} in {path} is not a valid captured record: {source}")]
    InvalidRecordLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: RecordError,
    },

    #[error("line {line} in {path} contains a duplicate record id '{id}'")]
    DuplicateRecordId {
        path: PathBuf,
        line: usize,
        id: String,
    },

    #[error("captured record '{id}' is invalid: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: RecordError,
    },

    #[error("a captured record with id '{id}' already exists")]
    DuplicateInsert { id: String },

    #[error("no captured record with id '{id}'")]
    NotFound { id: String },

    #[error("failed to format current UTC timestamp as RFC3339: {0}")]
    ClockFormat(#[source] time::error::Format),
}

impl SampleStoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn io_line(path: impl Into<PathBuf>, line: usize, source: std::io::Error) -> Self {
        Self::IoLine {
            path: path.into(),
            line,
            source,
        }
    }

    #[must_use]
    pub fn json_line(path: impl Into<PathBuf>, line: usize, source: serde_json::Error) -> Self {
        Self::JsonLineParse {
            path: path.into(),
            line,
            source,
        }
    }

    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// True for the store's "no such record" outcome, as opposed to a failed read.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
