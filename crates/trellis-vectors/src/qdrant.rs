//! Vector store backed by [Qdrant](https://qdrant.tech/).
//!
//! Each point carries its owning entity id as payload so seed hits can be
//! mapped back to graph nodes.
//!
//! # Feature Flag
//!
//! Enable the `qdrant` feature to compile this module:
//! ```toml
//! trellis-vectors = { version = "0.3", features = ["qdrant"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_core::EntityId;
//! use trellis_vectors::{DistanceMetric, EmbeddingPoint, QdrantStore, VectorStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = QdrantStore::connect(
//!         "http://localhost:6334",
//!         None, // no API key
//!         "trellis",
//!         1024,
//!         DistanceMetric::Cosine,
//!     )?;
//!     store.ensure_collection().await?;
//!
//!     let entity = EntityId::new();
//!     store
//!         .upsert(vec![EmbeddingPoint::new(vec![0.1; 1024], entity)])
//!         .await?;
//!
//!     let hits = store.search(&[0.1; 1024], 5).await?;
//!     Ok(())
//! }
//! ```

use crate::{
    DistanceMetric, EmbeddingPoint, SeedHit, VectorError, VectorResult, VectorStore,
};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointId, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use trellis_core::EntityId;

/// Payload key holding the entity id of each stored chunk.
const ENTITY_ID_KEY: &str = "entity_id";

/// Vector store backed by a Qdrant collection.
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
    metric: DistanceMetric,
}

impl QdrantStore {
    /// Create a client for a Qdrant server.
    ///
    /// The connection itself is lazy; call [`VectorStore::ensure_collection`]
    /// before writing.
    pub fn connect(
        url: &str,
        api_key: Option<&str>,
        collection: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> VectorResult<Self> {
        let client = if let Some(key) = api_key {
            Qdrant::from_url(url)
                .api_key(key)
                .build()
                .map_err(|e| VectorError::Connection(e.to_string()))?
        } else {
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorError::Connection(e.to_string()))?
        };

        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
            metric,
        })
    }

    /// Build the single-entry payload carrying the entity id.
    fn to_payload(entity_id: EntityId) -> HashMap<String, qdrant_client::qdrant::Value> {
        let mut payload = HashMap::new();
        payload.insert(
            ENTITY_ID_KEY.to_string(),
            qdrant_client::qdrant::Value::from(entity_id.to_string()),
        );
        payload
    }

    /// Read the entity id back out of a point's payload.
    fn entity_id_from_payload(
        point_id: &str,
        payload: &HashMap<String, qdrant_client::qdrant::Value>,
    ) -> VectorResult<EntityId> {
        use qdrant_client::qdrant::value::Kind;

        match payload.get(ENTITY_ID_KEY).and_then(|v| v.kind.as_ref()) {
            Some(Kind::StringValue(s)) => s.parse::<EntityId>().map_err(|e| {
                VectorError::Serialization(format!(
                    "invalid entity_id payload on point {}: {}",
                    point_id, e
                ))
            }),
            _ => Err(VectorError::Serialization(format!(
                "point {} is missing the entity_id payload",
                point_id
            ))),
        }
    }

    fn point_id_string(id: Option<PointId>) -> String {
        match id {
            Some(PointId {
                point_id_options: Some(opt),
            }) => match opt {
                qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u) => u,
                qdrant_client::qdrant::point_id::PointIdOptions::Num(n) => n.to_string(),
            },
            _ => String::new(),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn name(&self) -> &str {
        "qdrant"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }

    async fn ensure_collection(&self) -> VectorResult<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| VectorError::Connection(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            let distance = match self.metric {
                DistanceMetric::Cosine => Distance::Cosine,
                DistanceMetric::Euclidean => Distance::Euclid,
                DistanceMetric::DotProduct => Distance::Dot,
            };

            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, distance),
                    ),
                )
                .await
                .map_err(|e| VectorError::Collection(e.to_string()))?;
        }

        Ok(())
    }

    async fn upsert(&self, points: Vec<EmbeddingPoint>) -> VectorResult<()> {
        for point in &points {
            if point.vector.len() != self.dimension {
                return Err(VectorError::DimensionMismatch {
                    expected: self.dimension,
                    actual: point.vector.len(),
                });
            }
        }

        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|point| {
                PointStruct::new(
                    point.id.to_string(),
                    point.vector,
                    Self::to_payload(point.entity_id),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| VectorError::Api(e.to_string()))?;

        Ok(())
    }

    async fn search(&self, vector: &[f32], top_k: usize) -> VectorResult<Vec<SeedHit>> {
        if vector.len() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| VectorError::Api(e.to_string()))?;

        let mut hits = Vec::with_capacity(response.result.len());
        for point in response.result {
            let point_id = Self::point_id_string(point.id);
            let entity_id = Self::entity_id_from_payload(&point_id, &point.payload)?;

            hits.push(SeedHit {
                point_id,
                score: point.score,
                entity_id,
            });
        }

        Ok(hits)
    }

    async fn count(&self) -> VectorResult<usize> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| VectorError::Api(e.to_string()))?;

        Ok(info
            .result
            .map(|r| r.points_count.unwrap_or(0) as usize)
            .unwrap_or(0))
    }

    async fn health_check(&self) -> VectorResult<bool> {
        Ok(self.client.health_check().await.is_ok())
    }
}
