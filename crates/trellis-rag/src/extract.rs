//! Relation extraction with schema-validation retry.
//!
//! The model is asked for a JSON relation graph; responses that fail the
//! schema are retried under the pipeline's [`RetryPolicy`] alongside
//! transient transport failures. Permanent backend errors pass through on
//! the first attempt.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use trellis_core::RetryPolicy;
use trellis_llm::{ExtractionProfile, LlmBackend, LlmError, RawTriple, StructuredOutcome};

/// Errors from the extraction step.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The model kept producing output that failed schema validation.
    #[error("extraction output failed schema validation after {attempts} attempts: {reason}")]
    Schema { attempts: u32, reason: String },
    /// The backend call itself failed.
    #[error(transparent)]
    Backend(#[from] LlmError),
}

/// Runs structured relation extraction against an LLM backend.
pub struct Extractor {
    backend: Arc<dyn LlmBackend>,
    profile: ExtractionProfile,
    retry: RetryPolicy,
}

impl Extractor {
    pub fn new(backend: Arc<dyn LlmBackend>, profile: ExtractionProfile, retry: RetryPolicy) -> Self {
        Self {
            backend,
            profile,
            retry,
        }
    }

    /// Extract relation triples from `text`.
    ///
    /// Malformed responses are retried up to the policy's attempt budget;
    /// the returned [`ExtractError::Schema`] reports how many attempts were
    /// spent. An empty triple list is a valid outcome, not an error.
    pub async fn extract(&self, text: &str) -> Result<Vec<RawTriple>, ExtractError> {
        let result = self
            .retry
            .run(
                || {
                    let backend = Arc::clone(&self.backend);
                    let text = text.to_owned();
                    let profile = self.profile;
                    async move {
                        match backend.extract_relations(&text, profile).await? {
                            StructuredOutcome::Parsed(graph) => Ok(graph.graph),
                            StructuredOutcome::Malformed { raw, reason } => {
                                debug!(raw = %raw, "extraction response failed validation");
                                Err(ExtractError::Schema { attempts: 1, reason })
                            }
                        }
                    }
                },
                |err| match err {
                    ExtractError::Schema { .. } => true,
                    ExtractError::Backend(e) => e.is_transient(),
                },
            )
            .await;

        // A schema error only escapes once the attempt budget is spent.
        result.map_err(|err| match err {
            ExtractError::Schema { reason, .. } => ExtractError::Schema {
                attempts: self.retry.max_attempts.max(1),
                reason,
            },
            other => other,
        })
    }
}
