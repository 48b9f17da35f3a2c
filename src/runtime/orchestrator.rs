use futures_util::stream::{self, StreamExt};
use sample_store::{CapturedRecord, SampleStore, SampleStoreError};
use tracing::{debug, info, warn};

use crate::config::SynthesisConfig;
use crate::core::infer::{EventGroup, SchemaInferencer};
use crate::core::parser::PayloadParser;
use crate::error::{SampleError, SynthesisError, SynthesisWarning};
use crate::render::CodeSynthesizer;

/// Outcome of one successful synthesis call. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    /// Event groups in first-seen order of their discriminant.
    pub groups: Vec<EventGroup>,
    pub code: String,
    pub warnings: Vec<SynthesisWarning>,
}

/// Entry point: selected sample ids in, rendered handler out.
///
/// Holds only the store handle and configuration; every call to
/// [`synthesize`](Self::synthesize) is independent of every other.
#[derive(Debug, Clone)]
pub struct SynthesisOrchestrator<S> {
    store: S,
    config: SynthesisConfig,
}

impl<S: SampleStore> SynthesisOrchestrator<S> {
    pub fn new(store: S, config: SynthesisConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn synthesize(
        &self,
        sample_ids: &[String],
    ) -> Result<SynthesisResult, SynthesisError> {
        if sample_ids.is_empty() {
            return Err(SynthesisError::EmptySelection);
        }

        let selection = dedup_preserving_order(sample_ids);
        debug!(
            requested = sample_ids.len(),
            unique = selection.len(),
            "fetching selected samples"
        );
        let fetched = self.fetch_all(&selection).await;

        let parser = PayloadParser::new(&self.config);
        let mut parsed = Vec::with_capacity(fetched.len());
        let mut warnings = Vec::new();
        for (sample_id, outcome) in fetched {
            let sample = outcome
                .map_err(|error| SampleError::from_store(&sample_id, error))
                .and_then(|record| parser.parse(&record));
            match sample {
                Ok(sample) => parsed.push(sample),
                Err(error) => {
                    warn!(sample_id = %sample_id, %error, "skipping sample");
                    warnings.push(SynthesisWarning::from(error));
                }
            }
        }

        if parsed.is_empty() {
            return Err(SynthesisError::NoValidSamples {
                selected: selection.len(),
                warnings,
            });
        }

        let (groups, inference_warnings) = SchemaInferencer::new(&self.config).merge(parsed);
        for warning in &inference_warnings {
            warn!(sample_id = %warning.sample_id, reason = %warning.reason, "inference warning");
        }
        warnings.extend(inference_warnings);

        let code = CodeSynthesizer::new(&self.config).render(&groups);
        info!(
            groups = groups.len(),
            warnings = warnings.len(),
            bytes = code.len(),
            "rendered webhook handler"
        );

        Ok(SynthesisResult {
            groups,
            code,
            warnings,
        })
    }

    /// Reads every id concurrently and returns the outcomes in input order.
    async fn fetch_all(
        &self,
        sample_ids: &[String],
    ) -> Vec<(String, Result<CapturedRecord, SampleStoreError>)> {
        let mut fetched: Vec<_> = stream::iter(sample_ids.iter().enumerate())
            .map(|(index, sample_id)| async move {
                let outcome = self.store.fetch_by_id(sample_id).await;
                (index, sample_id.clone(), outcome)
            })
            .buffer_unordered(self.config.fetch_concurrency.max(1))
            .collect()
            .await;

        fetched.sort_by_key(|(index, _, _)| *index);
        fetched
            .into_iter()
            .map(|(_, sample_id, outcome)| (sample_id, outcome))
            .collect()
    }
}

fn dedup_preserving_order(sample_ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    sample_ids
        .iter()
        .filter(|sample_id| seen.insert(sample_id.as_str()))
        .cloned()
        .collect()
}
