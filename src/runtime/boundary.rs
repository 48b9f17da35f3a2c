use sample_store::SampleStore;
use serde::{Deserialize, Serialize};

use crate::error::{SynthesisError, SynthesisWarning};
use crate::runtime::orchestrator::SynthesisOrchestrator;

/// Body of a "generate handler" request: the ids the user ticked, in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub webhooks_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub code: String,
    #[serde(default)]
    pub warnings: Vec<SynthesisWarning>,
}

impl<S: SampleStore> SynthesisOrchestrator<S> {
    /// Request/response wrapper around [`synthesize`](Self::synthesize).
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, SynthesisError> {
        let result = self.synthesize(&request.webhooks_ids).await?;
        Ok(GenerateResponse {
            code: result.code,
            warnings: result.warnings,
        })
    }
}
