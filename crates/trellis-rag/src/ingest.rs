//! The ingestion pipeline: text to persisted graph and vector state.
//!
//! Steps run in a fixed order: ensure the vector collection, extract
//! relations, register nodes, persist the graph, persist the embeddings.
//! A failure halts the run and reports which step failed; completed writes
//! are not rolled back, and re-ingesting the same text is the recovery path.

use crate::chunk::{associate_chunks, split_chunks};
use crate::context::ServiceContext;
use crate::extract::{ExtractError, Extractor};
use crate::registry::NodeRegistry;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use trellis_core::{EntityId, RelationTuple, RetryPolicy};
use trellis_embeddings::EmbeddingError;
use trellis_graph::{GraphError, GraphResult};
use trellis_llm::ExtractionProfile;
use trellis_vectors::{EmbeddingPoint, VectorError};

/// The ordered steps of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStep {
    EnsureCollection,
    Extract,
    RegisterNodes,
    PersistGraph,
    PersistEmbeddings,
}

impl fmt::Display for IngestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnsureCollection => "ensure-collection",
            Self::Extract => "extract",
            Self::RegisterNodes => "register-nodes",
            Self::PersistGraph => "persist-graph",
            Self::PersistEmbeddings => "persist-embeddings",
        };
        f.write_str(name)
    }
}

/// Errors from an ingestion run, each tied to the step that failed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("collection setup failed: {0}")]
    Collection(VectorError),
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error("embedder produces {embedder}-dimensional vectors but the collection expects {collection}")]
    DimensionMismatch { embedder: usize, collection: usize },
    #[error("graph write failed: {0}")]
    Graph(GraphError),
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("vector write failed: {0}")]
    Vectors(VectorError),
}

impl IngestError {
    /// The pipeline step this error halted.
    pub fn step(&self) -> IngestStep {
        match self {
            Self::Collection(_) | Self::DimensionMismatch { .. } => IngestStep::EnsureCollection,
            Self::Extraction(_) => IngestStep::Extract,
            Self::Graph(_) => IngestStep::PersistGraph,
            Self::Embedding(_) | Self::Vectors(_) => IngestStep::PersistEmbeddings,
        }
    }
}

fn default_write_concurrency() -> usize {
    8
}

/// Tunables for the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Domain framing for the extraction prompt.
    pub profile: ExtractionProfile,
    /// Retry policy applied to every network-bound step.
    pub retry: RetryPolicy,
    /// Upper bound on concurrent graph writes.
    pub write_concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            profile: ExtractionProfile::default(),
            retry: RetryPolicy::default(),
            write_concurrency: default_write_concurrency(),
        }
    }
}

/// Counts from a completed ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Triples returned by extraction.
    pub triples_extracted: usize,
    /// Triples dropped for lacking a target or relationship type.
    pub triples_skipped: usize,
    /// Distinct entities registered.
    pub entities: usize,
    /// Relationships written to the graph.
    pub relationships: usize,
    /// Relationships skipped over a missing endpoint.
    pub relationships_skipped: usize,
    /// Chunks embedded and upserted.
    pub chunks_embedded: usize,
    /// Chunks with no registered-entity mention.
    pub chunks_skipped: usize,
}

/// Drives one document through extraction and into both stores.
pub struct IngestPipeline {
    ctx: ServiceContext,
    config: IngestConfig,
    extractor: Extractor,
}

impl IngestPipeline {
    pub fn new(ctx: ServiceContext, config: IngestConfig) -> Self {
        let extractor = Extractor::new(Arc::clone(&ctx.llm), config.profile, config.retry);
        Self {
            ctx,
            config,
            extractor,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest one document.
    ///
    /// Node writes all complete before the first relationship write, so no
    /// relationship is ever attempted against an unwritten endpoint. A
    /// relationship the store still rejects as dangling is skipped and
    /// counted, not fatal.
    pub async fn ingest(&self, text: &str) -> Result<IngestReport, IngestError> {
        let retry = self.config.retry;

        // The embedder and the collection must agree on dimensions before
        // anything is written.
        let embedder_dim = self.ctx.embedder.dimension();
        let collection_dim = self.ctx.vectors.dimension();
        if embedder_dim != collection_dim {
            return Err(IngestError::DimensionMismatch {
                embedder: embedder_dim,
                collection: collection_dim,
            });
        }

        debug!(step = %IngestStep::EnsureCollection, "ingest step");
        retry
            .run(
                || {
                    let vectors = Arc::clone(&self.ctx.vectors);
                    async move { vectors.ensure_collection().await }
                },
                VectorError::is_transient,
            )
            .await
            .map_err(IngestError::Collection)?;

        debug!(step = %IngestStep::Extract, "ingest step");
        let triples = self.extractor.extract(text).await?;

        debug!(step = %IngestStep::RegisterNodes, "ingest step");
        let batch = NodeRegistry::from_triples(&triples);
        if batch.skipped > 0 {
            warn!(
                count = batch.skipped,
                "triples without a target or relationship were dropped"
            );
        }

        debug!(step = %IngestStep::PersistGraph, "ingest step");
        self.persist_nodes(&batch.registry).await?;
        let (relationships, relationships_skipped) =
            self.persist_relationships(batch.tuples).await?;

        debug!(step = %IngestStep::PersistEmbeddings, "ingest step");
        let chunks = split_chunks(text);
        let (tagged, chunks_skipped) = associate_chunks(&chunks, &batch.registry);
        if chunks_skipped > 0 {
            warn!(
                count = chunks_skipped,
                "chunks without an entity mention were not embedded"
            );
        }

        let mut points = Vec::with_capacity(tagged.len());
        for chunk in &tagged {
            let vector = retry
                .run(
                    || {
                        let embedder = Arc::clone(&self.ctx.embedder);
                        let text = chunk.text.clone();
                        async move { embedder.embed(&text).await }
                    },
                    EmbeddingError::is_transient,
                )
                .await?;
            points.push(EmbeddingPoint::new(vector, chunk.entity_id));
        }

        let chunks_embedded = points.len();
        if !points.is_empty() {
            retry
                .run(
                    || {
                        let vectors = Arc::clone(&self.ctx.vectors);
                        let points = points.clone();
                        async move { vectors.upsert(points).await }
                    },
                    VectorError::is_transient,
                )
                .await
                .map_err(IngestError::Vectors)?;
        }

        let report = IngestReport {
            triples_extracted: triples.len(),
            triples_skipped: batch.skipped,
            entities: batch.registry.len(),
            relationships,
            relationships_skipped,
            chunks_embedded,
            chunks_skipped,
        };
        info!(
            entities = report.entities,
            relationships = report.relationships,
            chunks = report.chunks_embedded,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Write every registered node, bounded by `write_concurrency`.
    async fn persist_nodes(&self, registry: &NodeRegistry) -> Result<(), IngestError> {
        let retry = self.config.retry;
        let nodes: Vec<(EntityId, String)> = registry
            .entries()
            .map(|(name, id)| (id, name.to_string()))
            .collect();

        let results: Vec<GraphResult<()>> = stream::iter(nodes.into_iter().map(|(id, name)| {
            let graph = Arc::clone(&self.ctx.graph);
            async move {
                retry
                    .run(
                        || {
                            let graph = Arc::clone(&graph);
                            let name = name.clone();
                            async move { graph.upsert_node(&id, &name).await }
                        },
                        GraphError::is_transient,
                    )
                    .await
            }
        }))
        .buffer_unordered(self.config.write_concurrency.max(1))
        .collect()
        .await;

        for result in results {
            result.map_err(IngestError::Graph)?;
        }
        Ok(())
    }

    /// Write relationships, bounded by `write_concurrency`.
    ///
    /// Returns `(written, skipped)`. A missing endpoint skips that one
    /// relationship; any other graph error is fatal.
    async fn persist_relationships(
        &self,
        tuples: Vec<RelationTuple>,
    ) -> Result<(usize, usize), IngestError> {
        let retry = self.config.retry;
        let results: Vec<GraphResult<()>> = stream::iter(tuples.into_iter().map(|tuple| {
            let graph = Arc::clone(&self.ctx.graph);
            async move {
                retry
                    .run(
                        || {
                            let graph = Arc::clone(&graph);
                            let tuple = tuple.clone();
                            async move {
                                graph
                                    .create_relationship(&tuple.source, &tuple.target, &tuple.rel_type)
                                    .await
                            }
                        },
                        GraphError::is_transient,
                    )
                    .await
            }
        }))
        .buffer_unordered(self.config.write_concurrency.max(1))
        .collect()
        .await;

        let mut written = 0;
        let mut skipped = 0;
        for result in results {
            match result {
                Ok(()) => written += 1,
                Err(GraphError::MissingEndpoint(id)) => {
                    warn!(entity_id = %id, "skipping relationship with a missing endpoint");
                    skipped += 1;
                }
                Err(err) => return Err(IngestError::Graph(err)),
            }
        }
        Ok((written, skipped))
    }
}
