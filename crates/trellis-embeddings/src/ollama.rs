//! Ollama embedding backend.
//!
//! Uses Ollama's `/api/embeddings` endpoint. The configured dimension is
//! checked against every response so a misconfigured model fails loudly
//! instead of corrupting the vector collection.

use crate::{Embedder, EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default Ollama endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
/// Default embedding model.
pub const DEFAULT_MODEL: &str = "bge-m3";
/// Dimension of the default model.
pub const DEFAULT_DIMENSION: usize = 1024;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedder backed by a local Ollama server.
///
/// # Example
///
/// ```rust,ignore
/// use trellis_embeddings::{Embedder, OllamaEmbedder};
///
/// let embedder = OllamaEmbedder::localhost()?;
/// let vector = embedder.embed("hello world").await?;
/// ```
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    dimension: usize,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder with the default model.
    pub fn new(endpoint: &str) -> EmbeddingResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_MODEL, DEFAULT_DIMENSION, DEFAULT_TIMEOUT_SECS)
    }

    /// Create with explicit model, dimension, and timeout.
    pub fn with_timeout(
        endpoint: &str,
        model: &str,
        dimension: usize,
        timeout_secs: u64,
    ) -> EmbeddingResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Api(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
            timeout_secs,
            client,
        })
    }

    /// Connect to the default localhost port.
    pub fn localhost() -> EmbeddingResult<Self> {
        Self::new(DEFAULT_ENDPOINT)
    }

    fn map_send_error(&self, e: reqwest::Error) -> EmbeddingError {
        if e.is_connect() {
            EmbeddingError::ConnectionFailed(format!(
                "cannot reach Ollama at {} (is it running?)",
                self.endpoint
            ))
        } else if e.is_timeout() {
            EmbeddingError::Timeout(self.timeout_secs)
        } else {
            EmbeddingError::Api(e.to_string())
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 {
                return Err(EmbeddingError::ModelNotFound(format!(
                    "model '{}' is not installed, try: ollama pull {}",
                    self.model, self.model
                )));
            }

            return Err(EmbeddingError::Api(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let resp: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if resp.embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: resp.embedding.len(),
            });
        }

        Ok(resp.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let embedder = OllamaEmbedder::localhost().unwrap();
        assert_eq!(embedder.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(embedder.model_name(), "bge-m3");
        assert_eq!(embedder.dimension(), 1024);
    }

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let embedder =
            OllamaEmbedder::with_timeout("http://ollama.internal:11434/", "bge-m3", 1024, 30)
                .unwrap();
        assert_eq!(embedder.endpoint, "http://ollama.internal:11434");
    }

    #[test]
    fn test_request_serialization() {
        let request = OllamaEmbeddingRequest {
            model: "bge-m3".to_string(),
            prompt: "hello".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], serde_json::json!("bge-m3"));
        assert_eq!(value["prompt"], serde_json::json!("hello"));
    }
}
