//! # Trellis Vectors
//!
//! Vector index adapters for trellis semantic retrieval.
//!
//! This crate stores chunk embeddings tagged with the entity they mention and
//! finds the nearest stored embeddings for a query vector. Those hits seed the
//! graph expansion during retrieval.
//!
//! ## Supported Backends
//!
//! | Backend | Feature | Notes |
//! |---------|---------|-------|
//! | In-memory | (default) | Linear scan, fine for tests and small corpora |
//! | Qdrant | `qdrant` | Production deployments |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis_core::EntityId;
//! use trellis_vectors::{EmbeddingPoint, InMemoryStore, VectorStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::new(384);
//!     store.ensure_collection().await?;
//!
//!     let entity = EntityId::new();
//!     store
//!         .upsert(vec![EmbeddingPoint::new(vec![0.1; 384], entity)])
//!         .await?;
//!
//!     let hits = store.search(&[0.1; 384], 5).await?;
//!     for hit in hits {
//!         println!("{}: {:.3}", hit.entity_id, hit.score);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod memory;

#[cfg(feature = "qdrant")]
pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_core::EntityId;
use uuid::Uuid;

/// Failures surfaced by vector store operations.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("collection error: {0}")]
    Collection(String),

    #[error("payload error: {0}")]
    Serialization(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("bad configuration: {0}")]
    Config(String),
}

impl VectorError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Api(_))
    }
}

/// Shorthand for results carrying [`VectorError`].
pub type VectorResult<T> = Result<T, VectorError>;

/// A chunk embedding tagged with the entity it mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingPoint {
    /// Unique point identifier.
    pub id: Uuid,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// The entity this chunk was associated with at ingestion time.
    pub entity_id: EntityId,
}

impl EmbeddingPoint {
    /// Create a new point with a fresh identifier.
    pub fn new(vector: Vec<f32>, entity_id: EntityId) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            entity_id,
        }
    }

    /// Number of components in the vector.
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// A search hit from the vector store.
#[derive(Debug, Clone)]
pub struct SeedHit {
    /// The stored point identifier.
    pub point_id: String,
    /// Match score, higher meaning closer.
    pub score: f32,
    /// The entity the matching chunk mentions.
    pub entity_id: EntityId,
}

/// Scoring function used to rank matches.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Angle-based similarity, insensitive to magnitude.
    #[default]
    Cosine,
    /// Straight-line (L2) distance.
    Euclidean,
    /// Unnormalized inner product.
    DotProduct,
}

/// Settings shared by every vector backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// Vector dimension.
    pub dimension: usize,
    /// Collection name.
    pub collection: String,
    /// Distance metric.
    pub metric: DistanceMetric,
    /// Which backend to use and how to reach it.
    pub backend: VectorBackendConfig,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            dimension: 1024,
            collection: "trellis".to_string(),
            metric: DistanceMetric::Cosine,
            backend: VectorBackendConfig::Memory,
        }
    }
}

/// Backend selection, tagged by `type` in config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VectorBackendConfig {
    /// Process-local store, nothing persisted.
    Memory,

    /// Remote Qdrant deployment.
    Qdrant {
        /// Qdrant server URL.
        url: String,
        /// Optional API key sent with every request.
        #[serde(default)]
        api_key: Option<String>,
    },
}

/// Interface every vector backend implements.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Dimension this store was created with.
    fn dimension(&self) -> usize;

    /// Metric used to score matches.
    fn metric(&self) -> DistanceMetric;

    /// Create the collection if it does not exist yet.
    ///
    /// Idempotent. Must succeed before any writes are attempted.
    async fn ensure_collection(&self) -> VectorResult<()>;

    /// Insert or update points in the store.
    async fn upsert(&self, points: Vec<EmbeddingPoint>) -> VectorResult<()>;

    /// Find the `top_k` points nearest to the query vector.
    ///
    /// An empty collection yields an empty result, not an error.
    async fn search(&self, vector: &[f32], top_k: usize) -> VectorResult<Vec<SeedHit>>;

    /// Total number of stored points.
    async fn count(&self) -> VectorResult<usize>;

    /// Probe whether the backend is reachable.
    async fn health_check(&self) -> VectorResult<bool>;
}

/// Build the configured vector store.
///
/// Connecting is lazy; no requests are made until the store is used.
pub fn create_store(config: VectorStoreConfig) -> VectorResult<Box<dyn VectorStore>> {
    match config.backend {
        VectorBackendConfig::Memory => Ok(Box::new(memory::InMemoryStore::with_config(
            config.dimension,
            config.metric,
        ))),

        #[cfg(feature = "qdrant")]
        VectorBackendConfig::Qdrant { url, api_key } => {
            let store = qdrant::QdrantStore::connect(
                &url,
                api_key.as_deref(),
                &config.collection,
                config.dimension,
                config.metric,
            )?;
            Ok(Box::new(store))
        }

        #[cfg(not(feature = "qdrant"))]
        VectorBackendConfig::Qdrant { .. } => Err(VectorError::Config(
            "qdrant backend requires the `qdrant` feature".to_string(),
        )),
    }
}

// Convenience re-exports
pub use memory::InMemoryStore;

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantStore;

/// Similarity math shared by the store implementations.
pub mod util {
    /// Cosine of the angle between `a` and `b`, with zero vectors scoring 0.0.
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must share a dimension");

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }

    /// L2 distance between `a` and `b`.
    pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must share a dimension");

        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    /// Inner product of `a` and `b`.
    pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must share a dimension");

        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        // Parallel vectors score 1.0 regardless of magnitude
        let a = vec![2.0, 0.0, 0.0];
        let b = vec![5.0, 0.0, 0.0];
        assert!((util::cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);

        let c = vec![0.0, 3.0, 0.0];
        assert!(util::cosine_similarity(&a, &c).abs() < 1e-6);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = vec![1.0, 2.0];
        let b = vec![4.0, 6.0];
        assert!((util::euclidean_distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_embedding_point_ids_are_unique() {
        let entity = EntityId::new();
        let a = EmbeddingPoint::new(vec![0.1, 0.2], entity);
        let b = EmbeddingPoint::new(vec![0.1, 0.2], entity);

        assert_ne!(a.id, b.id);
        assert_eq!(a.entity_id, b.entity_id);
        assert_eq!(a.dimension(), 2);
    }

    #[test]
    fn test_backend_config_deserializes() {
        let config: VectorStoreConfig = serde_json::from_str(
            r#"{
                "dimension": 4,
                "collection": "notes",
                "metric": "euclidean",
                "backend": { "type": "qdrant", "url": "http://localhost:6334" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.dimension, 4);
        assert_eq!(config.metric, DistanceMetric::Euclidean);
        assert!(matches!(
            config.backend,
            VectorBackendConfig::Qdrant { ref url, api_key: None } if url == "http://localhost:6334"
        ));
    }
}
