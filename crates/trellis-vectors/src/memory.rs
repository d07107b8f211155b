//! Brute-force in-memory vector store.
//!
//! Scans every stored point per query. Useful for testing and small corpora.

use crate::{
    DistanceMetric, EmbeddingPoint, SeedHit, VectorError, VectorResult, VectorStore,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory vector store.
///
/// Mirrors the behavior of the networked backends, including the requirement
/// that [`VectorStore::ensure_collection`] runs before any write, so pipeline
/// ordering bugs show up in tests.
///
/// # Example
///
/// ```rust
/// use trellis_core::EntityId;
/// use trellis_vectors::{EmbeddingPoint, InMemoryStore, VectorStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new(3);
///     store.ensure_collection().await?;
///
///     let entity = EntityId::new();
///     store
///         .upsert(vec![EmbeddingPoint::new(vec![1.0, 0.0, 0.0], entity)])
///         .await?;
///
///     let hits = store.search(&[1.0, 0.0, 0.0], 1).await?;
///     assert_eq!(hits[0].entity_id, entity);
///
///     Ok(())
/// }
/// ```
pub struct InMemoryStore {
    points: RwLock<HashMap<Uuid, EmbeddingPoint>>,
    collection_created: AtomicBool,
    dimension: usize,
    metric: DistanceMetric,
}

impl InMemoryStore {
    /// Store scoring by cosine similarity.
    pub fn new(dimension: usize) -> Self {
        Self::with_config(dimension, DistanceMetric::Cosine)
    }

    /// Store with an explicit distance metric.
    pub fn with_config(dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            points: RwLock::new(HashMap::new()),
            collection_created: AtomicBool::new(false),
            dimension,
            metric,
        }
    }

    /// Whether `ensure_collection` has been called.
    pub fn collection_created(&self) -> bool {
        self.collection_created.load(Ordering::SeqCst)
    }

    /// Score a candidate against the query vector, higher meaning closer.
    fn compute_score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.metric {
            DistanceMetric::Cosine => crate::util::cosine_similarity(a, b),
            DistanceMetric::Euclidean => {
                // Invert so nearer vectors rank first
                let dist = crate::util::euclidean_distance(a, b);
                1.0 / (1.0 + dist)
            }
            DistanceMetric::DotProduct => crate::util::dot_product(a, b),
        }
    }

    fn require_collection(&self) -> VectorResult<()> {
        if !self.collection_created() {
            return Err(VectorError::Collection(
                "collection does not exist; call ensure_collection first".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }

    async fn ensure_collection(&self) -> VectorResult<()> {
        self.collection_created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(&self, points: Vec<EmbeddingPoint>) -> VectorResult<()> {
        self.require_collection()?;

        let mut store = self
            .points
            .write()
            .map_err(|e| VectorError::Connection(format!("point table lock poisoned: {}", e)))?;

        for point in points {
            if point.vector.len() != self.dimension {
                return Err(VectorError::DimensionMismatch {
                    expected: self.dimension,
                    actual: point.vector.len(),
                });
            }
            store.insert(point.id, point);
        }

        Ok(())
    }

    async fn search(&self, vector: &[f32], top_k: usize) -> VectorResult<Vec<SeedHit>> {
        self.require_collection()?;

        if vector.len() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let store = self
            .points
            .read()
            .map_err(|e| VectorError::Connection(format!("point table lock poisoned: {}", e)))?;

        let mut scored: Vec<_> = store
            .values()
            .map(|point| {
                let score = self.compute_score(vector, &point.vector);
                (point, score)
            })
            .collect();

        // Best score first
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let hits = scored
            .into_iter()
            .take(top_k)
            .map(|(point, score)| SeedHit {
                point_id: point.id.to_string(),
                score,
                entity_id: point.entity_id,
            })
            .collect();

        Ok(hits)
    }

    async fn count(&self) -> VectorResult<usize> {
        let store = self
            .points
            .read()
            .map_err(|e| VectorError::Connection(format!("point table lock poisoned: {}", e)))?;

        Ok(store.len())
    }

    async fn health_check(&self) -> VectorResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::EntityId;

    #[tokio::test]
    async fn test_upsert_and_search() {
        let store = InMemoryStore::new(3);
        store.ensure_collection().await.unwrap();

        let (a, b, c) = (EntityId::new(), EntityId::new(), EntityId::new());

        store
            .upsert(vec![
                EmbeddingPoint::new(vec![1.0, 0.0, 0.0], a),
                EmbeddingPoint::new(vec![0.0, 1.0, 0.0], b),
                EmbeddingPoint::new(vec![0.7, 0.7, 0.0], c),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entity_id, a);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_writes_require_collection() {
        let store = InMemoryStore::new(2);

        let result = store
            .upsert(vec![EmbeddingPoint::new(vec![1.0, 0.0], EntityId::new())])
            .await;
        assert!(matches!(result, Err(VectorError::Collection(_))));

        store.ensure_collection().await.unwrap();
        assert!(store.collection_created());

        store
            .upsert(vec![EmbeddingPoint::new(vec![1.0, 0.0], EntityId::new())])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ensure_collection_is_idempotent() {
        let store = InMemoryStore::new(2);

        store.ensure_collection().await.unwrap();
        store.ensure_collection().await.unwrap();

        assert!(store.collection_created());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_empty_collection_returns_no_hits() {
        let store = InMemoryStore::new(2);
        store.ensure_collection().await.unwrap();

        let hits = store.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let store = InMemoryStore::new(3);
        store.ensure_collection().await.unwrap();

        let result = store
            .upsert(vec![EmbeddingPoint::new(vec![1.0, 0.0], EntityId::new())])
            .await;

        assert!(matches!(result, Err(VectorError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn test_euclidean_metric() {
        let store = InMemoryStore::with_config(2, DistanceMetric::Euclidean);
        store.ensure_collection().await.unwrap();

        let close = EntityId::new();
        let far = EntityId::new();

        store
            .upsert(vec![
                EmbeddingPoint::new(vec![0.1, 0.0], close),
                EmbeddingPoint::new(vec![10.0, 0.0], far),
            ])
            .await
            .unwrap();

        let hits = store.search(&[0.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].entity_id, close);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_point() {
        let store = InMemoryStore::new(2);
        store.ensure_collection().await.unwrap();

        let entity = EntityId::new();
        let mut point = EmbeddingPoint::new(vec![1.0, 0.0], entity);
        store.upsert(vec![point.clone()]).await.unwrap();

        point.vector = vec![0.0, 1.0];
        store.upsert(vec![point]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let hits = store.search(&[0.0, 1.0], 1).await.unwrap();
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }
}
