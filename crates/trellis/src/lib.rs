//! # Trellis
//!
//! Hybrid graph and vector retrieval over LLM-extracted knowledge.
//!
//! Trellis ingests documents by asking an LLM for relation triples, writes
//! the resulting entities and relationships to a graph store, and embeds the
//! source chunks into a vector store. Questions are answered by embedding the
//! query, finding the nearest chunks, expanding their entities into a bounded
//! subgraph, and grounding a generated answer in that subgraph.
//!
//! ## Quick Start
//!
//! The in-memory stores and mock services run the whole pipeline without any
//! external process:
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(
//!     MockBackend::new()
//!         .with_response(
//!             "Here is the text",
//!             r#"{"graph": [{"node": "Insulin", "target_node": "Blood Sugar", "relationship": "regulates"}]}"#,
//!         )
//!         .with_response("Provide the answer", "Insulin keeps blood sugar in range."),
//! );
//! let ctx = ServiceContext::new(
//!     llm,
//!     Arc::new(MockEmbedder::new(8)),
//!     Arc::new(MemoryGraphStore::new()),
//!     Arc::new(InMemoryStore::new(8)),
//! );
//!
//! let report = IngestPipeline::new(ctx.clone(), IngestConfig::default())
//!     .ingest("Insulin regulates blood sugar.")
//!     .await?;
//! assert_eq!(report.entities, 2);
//!
//! let result = Retriever::new(ctx, RetrieveConfig::default())
//!     .retrieve("What regulates blood sugar?")
//!     .await?;
//! println!("{}", result.answer);
//! # Ok(())
//! # }
//! ```
//!
//! Production deployments swap in the real services. The factory functions
//! build stores from configuration, so the wiring is the same shape:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! let vectors: Arc<dyn VectorStore> = Arc::from(create_vector_store(VectorStoreConfig {
//!     dimension: 1024,
//!     collection: "notes".into(),
//!     metric: DistanceMetric::Cosine,
//!     backend: VectorBackendConfig::Qdrant {
//!         url: "http://localhost:6334".into(),
//!         api_key: None,
//!     },
//! })?);
//!
//! let graph: Arc<dyn GraphStore> = Arc::from(create_graph_store(GraphBackendConfig::Neo4j {
//!     url: "http://localhost:7474".into(),
//!     database: "neo4j".into(),
//!     username: "neo4j".into(),
//!     password: "secret".into(),
//! })?);
//!
//! let ctx = ServiceContext::new(
//!     Arc::new(OllamaBackend::localhost()),
//!     Arc::new(OllamaEmbedder::localhost()?),
//!     graph,
//!     vectors,
//! );
//! ```
//!
//! ## Architecture
//!
//! Trellis is split into focused crates:
//!
//! - [`trellis_core`] - shared ids, triples, and the retry policy
//! - [`trellis_llm`] - LLM backends, extraction and answer prompts
//! - [`trellis_embeddings`] - text embedding providers
//! - [`trellis_graph`] - graph stores and bounded neighborhood expansion
//! - [`trellis_vectors`] - vector stores and similarity search
//! - [`trellis_rag`] - the ingestion and retrieval pipelines
//!
//! ## Backends
//!
//! | Concern | In-process | Remote (feature) |
//! |---------|------------|------------------|
//! | Graph | `MemoryGraphStore` | Neo4j (`neo4j`) |
//! | Vectors | `InMemoryStore` | Qdrant (`qdrant`) |
//! | LLM | `MockBackend` | Ollama |
//! | Embeddings | `MockEmbedder` | Ollama |

// Re-export all subcrates
pub use trellis_core as core;
pub use trellis_embeddings as embeddings;
pub use trellis_graph as graph;
pub use trellis_llm as llm;
pub use trellis_rag as rag;
pub use trellis_vectors as vectors;

/// Prelude module for convenient imports.
///
/// ```rust
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    // Shared types
    pub use trellis_core::{Entity, EntityId, RelationTuple, RetryPolicy, Triple};

    // LLM backends and extraction
    pub use trellis_llm::{
        ExtractionProfile, LlmBackend, LlmConfig, LlmError, LlmResult, MockBackend, OllamaBackend,
        StructuredOutcome,
    };

    // Embeddings
    pub use trellis_embeddings::{
        Embedder, EmbeddingError, EmbeddingResult, MockEmbedder, OllamaEmbedder,
    };

    // Vector stores
    pub use trellis_vectors::{
        create_store as create_vector_store, DistanceMetric, EmbeddingPoint, InMemoryStore,
        SeedHit, VectorBackendConfig, VectorError, VectorResult, VectorStore, VectorStoreConfig,
    };

    // Graph stores
    pub use trellis_graph::{
        create_store as create_graph_store, ExpansionLimits, GraphBackendConfig, GraphError,
        GraphResult, GraphStore, Hops, MemoryGraphStore,
    };

    // Pipelines
    pub use trellis_rag::{
        GraphContext, IngestConfig, IngestError, IngestPipeline, IngestReport, IngestStep,
        RetrievalReport, RetrieveConfig, RetrieveError, Retriever, ServiceContext,
        NO_CONTEXT_ANSWER,
    };

    #[cfg(feature = "qdrant")]
    pub use trellis_vectors::QdrantStore;

    #[cfg(feature = "neo4j")]
    pub use trellis_graph::Neo4jStore;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
