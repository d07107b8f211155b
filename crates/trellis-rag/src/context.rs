//! Shared service handles for the pipelines.

use std::sync::Arc;
use trellis_embeddings::Embedder;
use trellis_graph::GraphStore;
use trellis_llm::LlmBackend;
use trellis_vectors::VectorStore;

/// The four services every pipeline run needs, passed explicitly.
///
/// Cloning is cheap (four `Arc`s), so ingestion and retrieval can share one
/// context, and tests can assemble a context from mocks without any global
/// state.
#[derive(Clone)]
pub struct ServiceContext {
    pub llm: Arc<dyn LlmBackend>,
    pub embedder: Arc<dyn Embedder>,
    pub graph: Arc<dyn GraphStore>,
    pub vectors: Arc<dyn VectorStore>,
}

impl ServiceContext {
    pub fn new(
        llm: Arc<dyn LlmBackend>,
        embedder: Arc<dyn Embedder>,
        graph: Arc<dyn GraphStore>,
        vectors: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            llm,
            embedder,
            graph,
            vectors,
        }
    }
}
