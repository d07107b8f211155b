//! # Trellis Graph
//!
//! Property graph adapters for the trellis knowledge pipeline.
//!
//! Entities extracted from text become `:Entity` nodes; each extracted triple
//! becomes a typed relationship between two of them. Retrieval expands a set
//! of seed entities into the surrounding subgraph, bounded by
//! [`ExpansionLimits`] so a dense hub cannot blow up the context.
//!
//! ## Supported Backends
//!
//! | Backend | Feature Flag | Description |
//! |---------|--------------|-------------|
//! | In-Memory | (default) | petgraph-backed store, good for testing |
//! | Neo4j | `neo4j` | Neo4j via the HTTP transactional endpoint |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis_core::EntityId;
//! use trellis_graph::{ExpansionLimits, GraphStore, Hops, MemoryGraphStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryGraphStore::new();
//!
//!     let insulin = EntityId::new();
//!     let pancreas = EntityId::new();
//!     store.upsert_node(&insulin, "Insulin").await?;
//!     store.upsert_node(&pancreas, "Pancreas").await?;
//!     store
//!         .create_relationship(&pancreas, &insulin, "produces")
//!         .await?;
//!
//!     let triples = store
//!         .neighbors(&[insulin], Hops::One, &ExpansionLimits::default())
//!         .await?;
//!     assert_eq!(triples.len(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod memory;

#[cfg(feature = "neo4j")]
pub mod neo4j;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_core::{EntityId, Triple};

/// Errors that can occur when working with graph stores.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("missing relationship endpoint: {0}")]
    MissingEndpoint(EntityId),

    #[error("query failed: {0}")]
    Query(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("bad configuration: {0}")]
    Config(String),
}

impl GraphError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Api(_) | Self::Timeout(_))
    }
}

/// Shorthand for results carrying [`GraphError`].
pub type GraphResult<T> = Result<T, GraphError>;

/// How far to expand around the seed entities.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Hops {
    /// Direct neighbors only.
    One,
    /// Neighbors and their neighbors.
    #[default]
    Two,
}

/// Caps on subgraph expansion.
///
/// `fanout_per_hop` bounds how many incident relationships are taken from any
/// single node; `max_triples` bounds the total subgraph size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionLimits {
    pub fanout_per_hop: usize,
    pub max_triples: usize,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            fanout_per_hop: 16,
            max_triples: 256,
        }
    }
}

/// Configuration for creating a graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraphBackendConfig {
    /// In-memory graph store (for testing).
    Memory,

    /// Neo4j via the HTTP transactional endpoint.
    Neo4j {
        /// Server URL, e.g. `http://localhost:7474`.
        url: String,
        /// Database name.
        #[serde(default = "default_database")]
        database: String,
        /// Username for basic auth.
        username: String,
        /// Password for basic auth.
        password: String,
    },
}

fn default_database() -> String {
    "neo4j".to_string()
}

impl Default for GraphBackendConfig {
    fn default() -> Self {
        GraphBackendConfig::Memory
    }
}

/// Abstract interface for the property graph backing the knowledge base.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Create the entity node if it does not exist yet.
    ///
    /// The name is set on first creation and left untouched afterwards.
    async fn upsert_node(&self, id: &EntityId, name: &str) -> GraphResult<()>;

    /// Create a typed relationship between two existing entities.
    ///
    /// Returns [`GraphError::MissingEndpoint`] if either endpoint has not
    /// been registered. Parallel relationships are allowed.
    async fn create_relationship(
        &self,
        source: &EntityId,
        target: &EntityId,
        rel_type: &str,
    ) -> GraphResult<()>;

    /// Expand the seeds into a bounded subgraph.
    ///
    /// Traversal is undirected but every returned triple keeps its stored
    /// orientation. Seeds missing from the graph are skipped. The result is
    /// deduplicated and capped at `limits.max_triples`.
    async fn neighbors(
        &self,
        seeds: &[EntityId],
        hops: Hops,
        limits: &ExpansionLimits,
    ) -> GraphResult<Vec<Triple>>;

    /// Total number of entity nodes.
    async fn node_count(&self) -> GraphResult<usize>;

    /// Total number of relationships.
    async fn relationship_count(&self) -> GraphResult<usize>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> GraphResult<bool>;
}

/// Create a graph store from configuration.
///
/// Connecting is lazy; no requests are made until the store is used.
pub fn create_store(config: GraphBackendConfig) -> GraphResult<Box<dyn GraphStore>> {
    match config {
        GraphBackendConfig::Memory => Ok(Box::new(memory::MemoryGraphStore::new())),

        #[cfg(feature = "neo4j")]
        GraphBackendConfig::Neo4j {
            url,
            database,
            username,
            password,
        } => {
            let store = neo4j::Neo4jStore::connect(&url, &database, &username, &password)?;
            Ok(Box::new(store))
        }

        #[cfg(not(feature = "neo4j"))]
        GraphBackendConfig::Neo4j { .. } => Err(GraphError::Config(
            "neo4j backend requires the `neo4j` feature".to_string(),
        )),
    }
}

// Re-export commonly used types
pub use memory::MemoryGraphStore;

#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_limits_defaults() {
        let limits = ExpansionLimits::default();
        assert_eq!(limits.fanout_per_hop, 16);
        assert_eq!(limits.max_triples, 256);
    }

    #[test]
    fn test_backend_config_deserializes() {
        let config: GraphBackendConfig = serde_json::from_str(
            r#"{
                "type": "neo4j",
                "url": "http://localhost:7474",
                "username": "neo4j",
                "password": "secret"
            }"#,
        )
        .unwrap();

        match config {
            GraphBackendConfig::Neo4j { url, database, .. } => {
                assert_eq!(url, "http://localhost:7474");
                assert_eq!(database, "neo4j");
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn test_hops_deserializes_lowercase() {
        let hops: Hops = serde_json::from_str("\"two\"").unwrap();
        assert_eq!(hops, Hops::Two);
    }
}
