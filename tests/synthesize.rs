
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use fixture::{capture, capture_raw, ids};
use hook_synth::{
    CapturedRecord, GenerateRequest, MemorySampleStore, ObjectShape, SampleStore,
    SampleStoreError, SchemaNode, SynthesisConfig, SynthesisError, SynthesisOrchestrator,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn orchestrator(records: Vec<CapturedRecord>) -> SynthesisOrchestrator<MemorySampleStore> {
    let store = MemorySampleStore::from_records(records).expect("store should accept captures");
    SynthesisOrchestrator::new(store, SynthesisConfig::default())
}

#[tokio::test]
async fn fields_missing_from_some_samples_become_optional() {
    let orchestrator = orchestrator(vec![
        capture("a", json!({"type": "payment_intent.succeeded", "amount": 100})),
        capture(
            "b",
            json!({"type": "payment_intent.succeeded", "receipt_email": "x@y.z"}),
        ),
    ]);

    let result = orchestrator
        .synthesize(&ids(&["a", "b"]))
        .await
        .expect("synthesis should succeed");

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.discriminant, "payment_intent.succeeded");
    assert_eq!(group.sample_ids, vec!["a", "b"]);
    assert_eq!(
        group.shape,
        ObjectShape::new()
            .with_required("type", SchemaNode::literals(["payment_intent.succeeded"]))
            .with_optional("amount", SchemaNode::number())
            .with_optional("receipt_email", SchemaNode::string())
    );
    assert!(result.code.contains("  amount?: number;\n"));
    assert!(result.code.contains("  receipt_email?: string;\n"));
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let orchestrator = orchestrator(Vec::new());
    assert_matches!(
        orchestrator.synthesize(&[]).await,
        Err(SynthesisError::EmptySelection)
    );
}

#[tokio::test]
async fn single_malformed_sample_yields_no_artifact() {
    let orchestrator = orchestrator(vec![capture_raw("a", "{not json")]);

    let error = orchestrator
        .synthesize(&ids(&["a"]))
        .await
        .expect_err("nothing usable was selected");
    assert_matches!(
        error,
        SynthesisError::NoValidSamples { selected: 1, warnings } => {
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].sample_id, "a");
        }
    );
}

#[tokio::test]
async fn one_malformed_sample_among_ten_is_a_single_warning() {
    let mut records = Vec::new();
    for index in 0..9 {
        let kind = if index % 2 == 0 { "charge.succeeded" } else { "charge.refunded" };
        records.push(capture(
            &format!("wh-{index}"),
            json!({"type": kind, "amount": index, "currency": "usd"}),
        ));
    }
    records.push(capture_raw("wh-9", r#"{"type": "charge.succeeded", "amount": "#));
    let selection: Vec<String> = records.iter().map(|record| record.id.clone()).collect();
    let orchestrator = orchestrator(records);

    let result = orchestrator
        .synthesize(&selection)
        .await
        .expect("synthesis should succeed");

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.groups[0].discriminant, "charge.succeeded");
    assert_eq!(result.groups[1].discriminant, "charge.refunded");
    assert_eq!(
        result.groups[0].sample_ids,
        vec!["wh-0", "wh-2", "wh-4", "wh-6", "wh-8"]
    );
    assert_eq!(result.groups[1].sample_ids, vec!["wh-1", "wh-3", "wh-5", "wh-7"]);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].sample_id, "wh-9");
    assert!(result.code.contains("export interface ChargeSucceededEvent {"));
    assert!(result.code.contains("export interface ChargeRefundedEvent {"));
}

#[tokio::test]
async fn unknown_ids_and_missing_discriminants_are_warnings() {
    let orchestrator = orchestrator(vec![
        capture("a", json!({"type": "invoice.paid", "total": 10})),
        capture("b", json!({"object": "event"})),
        capture("c", json!({"type": 7})),
    ]);

    let result = orchestrator
        .synthesize(&ids(&["missing", "a", "b", "c"]))
        .await
        .expect("one usable sample is enough");

    let warned: Vec<&str> = result
        .warnings
        .iter()
        .map(|warning| warning.sample_id.as_str())
        .collect();
    assert_eq!(warned, vec!["missing", "b", "c"]);
    assert_eq!(
        result.warnings[0].reason,
        "sample was not found in the capture store"
    );
    assert_eq!(result.groups.len(), 1);
}

#[tokio::test]
async fn deeply_nested_body_is_capped_with_one_warning() {
    let body = format!(
        r#"{{"type":"deep.event","id":"evt_1","a":{}0{}}}"#,
        "[".repeat(200),
        "]".repeat(200)
    );
    let orchestrator = orchestrator(vec![capture_raw("wh-1", &body)]);

    let result = orchestrator
        .synthesize(&ids(&["wh-1"]))
        .await
        .expect("valid JSON must yield an artifact");

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].discriminant, "deep.event");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].sample_id, "wh-1");
    assert!(result.warnings[0].reason.contains("nests deeper than 6 levels"));
    assert!(result.code.contains("  a: unknown[][][][][][];\n"));
}

#[tokio::test]
async fn non_json_content_type_is_skipped() {
    let form = capture_raw("form", "type=charge.succeeded")
        .with_content_type("application/x-www-form-urlencoded");
    let orchestrator = orchestrator(vec![
        form,
        capture("a", json!({"type": "charge.succeeded"})),
    ]);

    let result = orchestrator
        .synthesize(&ids(&["form", "a"]))
        .await
        .expect("synthesis should succeed");

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].sample_id, "form");
    assert!(result.warnings[0].reason.contains("application/x-www-form-urlencoded"));
}

#[tokio::test]
async fn duplicate_ids_are_folded_once() {
    let orchestrator = orchestrator(vec![capture("a", json!({"type": "ping"}))]);

    let result = orchestrator
        .synthesize(&ids(&["a", "a", "a"]))
        .await
        .expect("synthesis should succeed");

    assert_eq!(result.groups[0].sample_ids, vec!["a"]);
    assert!(result.code.starts_with(
        "// Generated by hook_synth from 1 captured sample(s) across 1 event kind(s).\n"
    ));
}

#[tokio::test]
async fn generate_wraps_synthesize() {
    let orchestrator = orchestrator(vec![capture("a", json!({"type": "ping"}))]);
    let request: GenerateRequest =
        serde_json::from_value(json!({"webhooksIds": ["a", "nope"]})).expect("request");

    let response = orchestrator.generate(&request).await.expect("response");
    assert!(response.code.contains("export type WebhookEvent = PingEvent;"));
    assert_eq!(response.warnings.len(), 1);
    assert_eq!(response.warnings[0].sample_id, "nope");
}

/// Yields a different number of times per id so reads complete out of order,
/// and records the peak number of reads in flight.
struct SlowStore {
    inner: MemorySampleStore,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl SampleStore for SlowStore {
    async fn fetch_by_id(&self, id: &str) -> Result<CapturedRecord, SampleStoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = 10 - id.trim_start_matches("wh-").parse::<usize>().unwrap_or(0);
        for _ in 0..delay {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.fetch_by_id(id).await
    }
}

#[tokio::test]
async fn concurrent_reads_are_bounded_and_keep_selection_order() {
    let records: Vec<CapturedRecord> = (0..8)
        .map(|index| {
            capture(
                &format!("wh-{index}"),
                json!({"type": format!("kind.{index}")}),
            )
        })
        .collect();
    let selection: Vec<String> = records.iter().map(|record| record.id.clone()).collect();
    let store = Arc::new(SlowStore {
        inner: MemorySampleStore::from_records(records).expect("store"),
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let config = SynthesisConfig::default().with_fetch_concurrency(3);
    let orchestrator = SynthesisOrchestrator::new(Arc::clone(&store), config);

    let result = orchestrator
        .synthesize(&selection)
        .await
        .expect("synthesis should succeed");

    let kinds: Vec<&str> = result
        .groups
        .iter()
        .map(|group| group.discriminant.as_str())
        .collect();
    assert_eq!(
        kinds,
        (0..8).map(|index| format!("kind.{index}")).collect::<Vec<_>>()
    );
    assert!(store.peak.load(Ordering::SeqCst) <= 3);
}

struct BrokenStore;

#[async_trait]
impl SampleStore for BrokenStore {
    async fn fetch_by_id(&self, _id: &str) -> Result<CapturedRecord, SampleStoreError> {
        Err(SampleStoreError::io(
            "reading capture",
            "/var/lib/captures.jsonl",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        ))
    }
}

#[tokio::test]
async fn store_failures_are_reported_per_sample() {
    let orchestrator = SynthesisOrchestrator::new(BrokenStore, SynthesisConfig::default());

    let error = orchestrator
        .synthesize(&ids(&["a", "b"]))
        .await
        .expect_err("every read failed");
    assert_matches!(
        error,
        SynthesisError::NoValidSamples { selected: 2, warnings } => {
            assert_eq!(warnings.len(), 2);
            assert!(warnings[0].reason.starts_with("sample could not be read from the capture store"));
        }
    );
}
