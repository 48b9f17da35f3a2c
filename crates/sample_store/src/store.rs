use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SampleStoreError;
use crate::schema::{normalize_record, CapturedRecord};

/// Read-only access to captured webhook deliveries.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Fetches one record. A missing record is reported as [`SampleStoreError::NotFound`].
    async fn fetch_by_id(&self, id: &str) -> Result<CapturedRecord, SampleStoreError>;
}

#[async_trait]
impl<S> SampleStore for Arc<S>
where
    S: SampleStore + ?Sized,
{
    async fn fetch_by_id(&self, id: &str) -> Result<CapturedRecord, SampleStoreError> {
        (**self).fetch_by_id(id).await
    }
}

/// Captures exported as JSON lines, one record per line, loaded eagerly.
#[derive(Debug)]
pub struct JsonlSampleStore {
    pub(crate) path: PathBuf,
    pub(crate) records: Vec<CapturedRecord>,
    pub(crate) index_by_id: HashMap<String, usize>,
}

impl JsonlSampleStore {
    pub fn open(path: &Path) -> Result<Self, SampleStoreError> {
        let path = path.to_path_buf();
        let file = File::open(&path)
            .map_err(|source| SampleStoreError::io("opening capture file", &path, source))?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        let mut index_by_id = HashMap::new();

        for (line_index, line_result) in reader.lines().enumerate() {
            let line_number = line_index + 1;
            let line = line_result
                .map_err(|source| SampleStoreError::io_line(&path, line_number, source))?;
            if line.trim().is_empty() {
                continue;
            }

            let record = parse_record_line(&path, line_number, &line)?;
            if index_by_id.contains_key(&record.id) {
                return Err(SampleStoreError::DuplicateRecordId {
                    path,
                    line: line_number,
                    id: record.id,
                });
            }

            index_by_id.insert(record.id.clone(), records.len());
            records.push(record);
        }

        Ok(Self {
            path,
            records,
            index_by_id,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record ids in file order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.id.as_str())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CapturedRecord> {
        self.index_by_id.get(id).map(|&index| &self.records[index])
    }
}

#[async_trait]
impl SampleStore for JsonlSampleStore {
    async fn fetch_by_id(&self, id: &str) -> Result<CapturedRecord, SampleStoreError> {
        self.get(id)
            .cloned()
            .ok_or_else(|| SampleStoreError::not_found(id))
    }
}

/// In-process store for embedding callers and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySampleStore {
    records: HashMap<String, CapturedRecord>,
}

impl MemorySampleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(
        records: impl IntoIterator<Item = CapturedRecord>,
    ) -> Result<Self, SampleStoreError> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    pub fn insert(&mut self, record: CapturedRecord) -> Result<(), SampleStoreError> {
        let id = record.id.clone();
        let record =
            normalize_record(record).map_err(|source| SampleStoreError::InvalidRecord {
                id: id.clone(),
                source,
            })?;
        if self.records.contains_key(&id) {
            return Err(SampleStoreError::DuplicateInsert { id });
        }

        self.records.insert(id, record);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SampleStore for MemorySampleStore {
    async fn fetch_by_id(&self, id: &str) -> Result<CapturedRecord, SampleStoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| SampleStoreError::not_found(id))
    }
}

pub(crate) fn parse_record_line(
    path: &Path,
    line_number: usize,
    line: &str,
) -> Result<CapturedRecord, SampleStoreError> {
    let record = serde_json::from_str::<CapturedRecord>(line)
        .map_err(|source| SampleStoreError::json_line(path, line_number, source))?;

    normalize_record(record).map_err(|source| SampleStoreError::InvalidRecordLine {
        path: path.to_path_buf(),
        line: line_number,
        source,
    })
}
