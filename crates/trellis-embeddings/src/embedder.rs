//! Core embedder trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Embedding error types.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl EmbeddingError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Api(_) | Self::ConnectionFailed(_) | Self::Timeout(_)
        )
    }
}

/// Shorthand for results carrying [`EmbeddingError`].
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Interface every embedding provider implements.
///
/// Implementors convert text to dense vectors of a fixed dimension. The
/// dimension must match the vector store's collection configuration.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text into a dense vector.
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Embed multiple texts, one request per text.
    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Width of the vectors this embedder produces.
    fn dimension(&self) -> usize;

    /// Model identifier for logs and diagnostics.
    fn model_name(&self) -> &str;

    /// Probe whether the backend is reachable.
    async fn health_check(&self) -> EmbeddingResult<bool> {
        match self.embed("ping").await {
            Ok(_) => Ok(true),
            Err(EmbeddingError::ConnectionFailed(_)) => Ok(false),
            Err(_) => Ok(true),
        }
    }
}
