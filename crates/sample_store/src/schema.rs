use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{RecordError, SampleStoreError};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One captured webhook delivery, as persisted by the capture endpoint.
///
/// Field names on the wire follow the capture database columns (`statusCode`,
/// `contentType`, `createdAt`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRecord {
    pub id: String,
    pub method: String,
    pub pathname: String,
    pub ip: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    /// Header names are stored lowercase once a record has been accepted by a store.
    #[serde(default, deserialize_with = "deserialize_unique_headers")]
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub created_at: String,
}

impl CapturedRecord {
    /// Builds a fresh JSON POST capture with a random id, stamped with the current UTC time.
    pub fn json(
        pathname: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, SampleStoreError> {
        let body = body.into();
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(SampleStoreError::ClockFormat)?;

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), JSON_CONTENT_TYPE.to_string());

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            method: "POST".to_string(),
            pathname: pathname.into(),
            ip: "127.0.0.1".to_string(),
            status_code: 200,
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
            content_length: Some(body.len() as u64),
            headers,
            body,
            created_at,
        })
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.headers
            .insert("content-type".to_string(), content_type.clone());
        self.content_type = Some(content_type);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the body is declared as JSON. An undeclared content type is treated as JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        let Some(content_type) = self.content_type.as_deref() else {
            return true;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        essence == JSON_CONTENT_TYPE
            || (essence.starts_with("application/") && essence.ends_with("+json"))
    }
}

/// Header maps where a repeated name is an error instead of last-one-wins.
fn deserialize_unique_headers<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueHeaders;

    impl<'de> Visitor<'de> for UniqueHeaders {
        type Value = BTreeMap<String, String>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map of header names to values")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut headers = BTreeMap::new();
            while let Some((name, value)) = access.next_entry::<String, String>()? {
                if headers.contains_key(&name) {
                    return Err(de::Error::custom(format!(
                        "header '{name}' appears more than once"
                    )));
                }
                headers.insert(name, value);
            }
            Ok(headers)
        }
    }

    deserializer.deserialize_map(UniqueHeaders)
}

/// Validates a record and lowercases its header names.
pub(crate) fn normalize_record(mut record: CapturedRecord) -> Result<CapturedRecord, RecordError> {
    if record.id.trim().is_empty() {
        return Err(RecordError::EmptyId);
    }

    if OffsetDateTime::parse(&record.created_at, &Rfc3339).is_err() {
        return Err(RecordError::InvalidTimestamp {
            value: record.created_at,
        });
    }

    let mut headers = BTreeMap::new();
    for (name, value) in std::mem::take(&mut record.headers) {
        let lowered = name.to_ascii_lowercase();
        if headers.contains_key(&lowered) {
            return Err(RecordError::DuplicateHeader { name: lowered });
        }
        headers.insert(lowered, value);
    }
    record.headers = headers;

    Ok(record)
}
