//! Mock embedder for testing.

use crate::{Embedder, EmbeddingResult};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic embedder for testing without a model server.
///
/// Returns canned vectors for registered texts and falls back to a
/// hash-derived vector otherwise, so identical texts always embed
/// identically.
///
/// # Example
///
/// ```rust,ignore
/// let embedder = MockEmbedder::new(4)
///     .with_vector("insulin", vec![1.0, 0.0, 0.0, 0.0]);
/// ```
pub struct MockEmbedder {
    dimension: usize,
    canned: HashMap<String, Vec<f32>>,
    embed_calls: AtomicUsize,
}

impl MockEmbedder {
    /// Create a new mock embedder with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            canned: HashMap::new(),
            embed_calls: AtomicUsize::new(0),
        }
    }

    /// Register a canned vector for an exact text.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.canned.insert(text.to_string(), vector);
        self
    }

    /// Number of embed calls made.
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Derive a deterministic unit vector from the text.
    fn hashed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for seed in 0..4u64 {
            let mut hasher = DefaultHasher::new();
            seed.hash(&mut hasher);
            text.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dimension;
            let value = ((h % 2000) as f32) / 1000.0 - 1.0;
            vector[idx] += value;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(vector) = self.canned.get(text) {
            return Ok(vector.clone());
        }

        Ok(self.hashed(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_vector_wins() {
        let embedder = MockEmbedder::new(4).with_vector("insulin", vec![1.0, 0.0, 0.0, 0.0]);

        let vector = embedder.embed("insulin").await.unwrap();
        assert_eq!(vector, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_hashed_fallback_is_deterministic() {
        let embedder = MockEmbedder::new(16);

        let v1 = embedder.embed("pancreas").await.unwrap();
        let v2 = embedder.embed("pancreas").await.unwrap();
        let v3 = embedder.embed("glucose").await.unwrap();

        assert_eq!(v1.len(), 16);
        assert_eq!(v1, v2);
        assert_ne!(v1, v3);
    }

    #[tokio::test]
    async fn test_embed_calls_counted() {
        let embedder = MockEmbedder::new(4);

        embedder.embed("a").await.unwrap();
        embedder.embed("b").await.unwrap();

        assert_eq!(embedder.embed_calls(), 2);
    }

    #[tokio::test]
    async fn test_batch_uses_embed() {
        let embedder = MockEmbedder::new(4);

        let vectors = embedder.embed_batch(&["a", "b", "c"]).await.unwrap();

        assert_eq!(vectors.len(), 3);
        assert_eq!(embedder.embed_calls(), 3);
    }
}
