//! Read-only access to captured webhook deliveries.
//!
//! The synthesis engine consumes captures through the [`SampleStore`] port and
//! never writes back. Two adapters ship here: [`JsonlSampleStore`] for capture
//! exports (one camelCase JSON record per line) and [`MemorySampleStore`] for
//! embedding callers and tests.

mod error;
mod schema;
mod store;

pub use error::{RecordError, SampleStoreError};
pub use schema::{CapturedRecord, JSON_CONTENT_TYPE};
pub use store::{JsonlSampleStore, MemorySampleStore, SampleStore};
