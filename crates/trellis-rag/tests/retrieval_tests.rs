//! End-to-end retrieval tests over in-memory services.
//!
//! The corpus is ingested through the real pipeline with canned embeddings,
//! so vector search is deterministic and the tests can pin down exactly
//! which seeds each query produces.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trellis_core::{EntityId, RetryPolicy, Triple};
use trellis_embeddings::MockEmbedder;
use trellis_graph::{
    ExpansionLimits, GraphResult, GraphStore, Hops, MemoryGraphStore,
};
use trellis_llm::{LlmBackend, LlmConfig, LlmError, LlmResult, MockBackend};
use trellis_rag::{
    IngestConfig, IngestPipeline, RetrieveConfig, RetrieveError, Retriever, ServiceContext,
    NO_CONTEXT_ANSWER,
};
use trellis_vectors::{InMemoryStore, VectorStore};

const CHAIN_EXTRACTION: &str = r#"{"graph": [
    {"node": "A", "target_node": "B", "relationship": "causes"},
    {"node": "B", "target_node": "C", "relationship": "causes"}
]}"#;

const CHAIN_TEXT: &str = "A causes B.\nB causes C.";

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3)
        .with_base_delay_ms(1)
        .with_max_delay_ms(2)
}

fn unit(dimension: usize, axis: usize) -> Vec<f32> {
    let mut vector = vec![0.0; dimension];
    vector[axis] = 1.0;
    vector
}

/// An embedder with one canned vector per chain chunk and query.
fn chain_embedder() -> MockEmbedder {
    MockEmbedder::new(4)
        .with_vector("A causes B.", unit(4, 0))
        .with_vector("B causes C.", unit(4, 1))
        .with_vector("What does B cause?", unit(4, 1))
}

fn chain_backend() -> MockBackend {
    MockBackend::new()
        .with_response("Here is the text", CHAIN_EXTRACTION)
        .with_response("Provide the answer", "C, through the chain from B.")
}

async fn ingest_chain(ctx: &ServiceContext) {
    let config = IngestConfig {
        retry: fast_retry(),
        ..Default::default()
    };
    IngestPipeline::new(ctx.clone(), config)
        .ingest(CHAIN_TEXT)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_seed_expansion_grounds_answer() {
    let backend = Arc::new(chain_backend());
    let embedder = Arc::new(chain_embedder());
    let graph = Arc::new(MemoryGraphStore::new());
    let vectors = Arc::new(InMemoryStore::new(4));
    let ctx = ServiceContext::new(backend, embedder, graph.clone(), vectors);
    ingest_chain(&ctx).await;

    let config = RetrieveConfig {
        top_k: 1,
        retry: fast_retry(),
        ..Default::default()
    };
    let report = Retriever::new(ctx, config)
        .retrieve("What does B cause?")
        .await
        .unwrap();

    // The query vector matches the "B causes C." chunk exactly, so the one
    // seed is entity B; both chain edges sit one hop out.
    assert_eq!(report.seeds.len(), 1);
    assert_eq!(
        graph.node_name(&report.seeds[0].entity_id).as_deref(),
        Some("B")
    );
    assert_eq!(report.subgraph.len(), 2);

    let mut edges = report.context.edges.clone();
    edges.sort();
    assert_eq!(edges, vec!["A causes B", "B causes C"]);

    let mut nodes = report.context.nodes.clone();
    nodes.sort();
    assert_eq!(nodes, vec!["A", "B", "C"]);

    assert_eq!(report.answer, "C, through the chain from B.");
}

/// Counts expansion calls so tests can assert the short-circuit path.
struct SpyGraph {
    inner: MemoryGraphStore,
    neighbors_calls: AtomicUsize,
}

impl SpyGraph {
    fn new() -> Self {
        Self {
            inner: MemoryGraphStore::new(),
            neighbors_calls: AtomicUsize::new(0),
        }
    }

    fn neighbors_calls(&self) -> usize {
        self.neighbors_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphStore for SpyGraph {
    fn name(&self) -> &str {
        "spy"
    }

    async fn upsert_node(&self, id: &EntityId, name: &str) -> GraphResult<()> {
        self.inner.upsert_node(id, name).await
    }

    async fn create_relationship(
        &self,
        source: &EntityId,
        target: &EntityId,
        rel_type: &str,
    ) -> GraphResult<()> {
        self.inner.create_relationship(source, target, rel_type).await
    }

    async fn neighbors(
        &self,
        seeds: &[EntityId],
        hops: Hops,
        limits: &ExpansionLimits,
    ) -> GraphResult<Vec<Triple>> {
        self.neighbors_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.neighbors(seeds, hops, limits).await
    }

    async fn node_count(&self) -> GraphResult<usize> {
        self.inner.node_count().await
    }

    async fn relationship_count(&self) -> GraphResult<usize> {
        self.inner.relationship_count().await
    }

    async fn health_check(&self) -> GraphResult<bool> {
        self.inner.health_check().await
    }
}

#[tokio::test]
async fn test_empty_collection_short_circuits() {
    let backend = Arc::new(chain_backend());
    let embedder = Arc::new(MockEmbedder::new(4));
    let graph = Arc::new(SpyGraph::new());
    let vectors = Arc::new(InMemoryStore::new(4));
    vectors.ensure_collection().await.unwrap();
    let ctx = ServiceContext::new(backend.clone(), embedder, graph.clone(), vectors);

    let config = RetrieveConfig {
        retry: fast_retry(),
        ..Default::default()
    };
    let report = Retriever::new(ctx, config)
        .retrieve("anything at all")
        .await
        .unwrap();

    assert!(report.is_no_context());
    assert_eq!(report.answer, NO_CONTEXT_ANSWER);
    assert!(report.seeds.is_empty());
    assert!(report.subgraph.is_empty());
    assert!(report.context.is_empty());

    // Neither expansion nor generation ran.
    assert_eq!(graph.neighbors_calls(), 0);
    assert_eq!(backend.complete_calls(), 0);
}

#[tokio::test]
async fn test_missing_collection_surfaces_search_error() {
    let backend = Arc::new(chain_backend());
    let embedder = Arc::new(MockEmbedder::new(4));
    let graph = Arc::new(MemoryGraphStore::new());
    let vectors = Arc::new(InMemoryStore::new(4));
    let ctx = ServiceContext::new(backend, embedder, graph, vectors);

    let config = RetrieveConfig {
        retry: fast_retry(),
        ..Default::default()
    };
    let err = Retriever::new(ctx, config)
        .retrieve("anything")
        .await
        .unwrap_err();
    assert!(matches!(err, RetrieveError::Search(_)));
}

/// Extracts fine but fails every free-form completion.
struct NoAnswerLlm {
    config: LlmConfig,
}

#[async_trait]
impl LlmBackend for NoAnswerLlm {
    fn name(&self) -> &str {
        "no-answer"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn complete(&self, _prompt: &str) -> LlmResult<String> {
        Err(LlmError::Api("model unavailable".to_string()))
    }

    async fn complete_structured(&self, _prompt: &str, _system: Option<&str>) -> LlmResult<String> {
        Ok(CHAIN_EXTRACTION.to_string())
    }
}

#[tokio::test]
async fn test_generation_failure_becomes_answer_text() {
    let backend = Arc::new(NoAnswerLlm {
        config: LlmConfig::default(),
    });
    let embedder = Arc::new(chain_embedder());
    let graph = Arc::new(MemoryGraphStore::new());
    let vectors = Arc::new(InMemoryStore::new(4));
    let ctx = ServiceContext::new(backend, embedder, graph, vectors);
    ingest_chain(&ctx).await;

    let config = RetrieveConfig {
        top_k: 1,
        retry: fast_retry(),
        ..Default::default()
    };
    let report = Retriever::new(ctx, config)
        .retrieve("What does B cause?")
        .await
        .unwrap();

    // Retrieval still succeeds; the failure is reported in the answer text.
    assert!(report.answer.starts_with("Error generating answer:"));
    assert!(report.answer.contains("model unavailable"));
    assert_eq!(report.subgraph.len(), 2);
}

#[tokio::test]
async fn test_duplicate_seed_entities_expand_once() {
    let extraction = r#"{"graph": [
        {"node": "B", "target_node": "C", "relationship": "causes"},
        {"node": "B", "target_node": "D", "relationship": "precedes"}
    ]}"#;
    let backend = Arc::new(
        MockBackend::new()
            .with_response("Here is the text", extraction)
            .with_response("Provide the answer", "Both C and D."),
    );
    // Both chunks mention B first and share one canned vector, so the query
    // returns two hits for the same entity.
    let embedder = Arc::new(
        MockEmbedder::new(4)
            .with_vector("B causes C.", unit(4, 0))
            .with_vector("B precedes D.", unit(4, 0))
            .with_vector("What does B do?", unit(4, 0)),
    );
    let graph = Arc::new(MemoryGraphStore::new());
    let vectors = Arc::new(InMemoryStore::new(4));
    let ctx = ServiceContext::new(backend, embedder, graph, vectors);

    let ingest = IngestConfig {
        retry: fast_retry(),
        ..Default::default()
    };
    IngestPipeline::new(ctx.clone(), ingest)
        .ingest("B causes C.\nB precedes D.")
        .await
        .unwrap();

    let config = RetrieveConfig {
        retry: fast_retry(),
        ..Default::default()
    };
    let report = Retriever::new(ctx, config)
        .retrieve("What does B do?")
        .await
        .unwrap();

    assert_eq!(report.seeds.len(), 2);
    // One expansion of entity B, no duplicated triples.
    assert_eq!(report.subgraph.len(), 2);
    let mut edges = report.context.edges.clone();
    edges.sort();
    assert_eq!(edges, vec!["B causes C", "B precedes D"]);
}
