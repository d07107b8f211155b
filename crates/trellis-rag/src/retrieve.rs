//! The retrieval pipeline: query to grounded answer.
//!
//! A query is embedded, matched against the vector collection for seed
//! entities, and the seeds are expanded into a bounded subgraph that grounds
//! the generated answer. No seeds means the stored corpus has nothing
//! relevant: the pipeline short-circuits with a fixed terminal answer and
//! never touches the graph or the generator.

use crate::assemble::GraphContext;
use crate::context::ServiceContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use trellis_core::{RetryPolicy, Triple};
use trellis_embeddings::EmbeddingError;
use trellis_graph::{ExpansionLimits, GraphError, Hops};
use trellis_llm::{AnswerPrompt, LlmError, PromptTemplate};
use trellis_vectors::{SeedHit, VectorError};

/// Terminal answer when seed search comes back empty.
pub const NO_CONTEXT_ANSWER: &str = "No relevant context found for this query.";

/// Errors from the retrieval pipeline.
///
/// Generation failures are not here: a retrieval that found context always
/// produces an answer string, falling back to a description of the failure.
#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("seed search failed: {0}")]
    Search(VectorError),
    #[error("graph expansion failed: {0}")]
    Expansion(GraphError),
}

fn default_top_k() -> usize {
    5
}

/// Tunables for the retrieval pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieveConfig {
    /// Seed count requested from the vector store.
    pub top_k: usize,
    /// Expansion depth around the seeds.
    pub hops: Hops,
    /// Caps on expansion size.
    pub limits: ExpansionLimits,
    /// Retry policy applied to every network-bound step.
    pub retry: RetryPolicy,
}

impl Default for RetrieveConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            hops: Hops::default(),
            limits: ExpansionLimits::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Everything one retrieval produced, for the caller and for inspection.
#[derive(Debug, Clone)]
pub struct RetrievalReport {
    /// The generated (or terminal) answer.
    pub answer: String,
    /// Seed hits from the vector search, best first.
    pub seeds: Vec<SeedHit>,
    /// The expanded subgraph the answer was grounded on.
    pub subgraph: Vec<Triple>,
    /// The assembled prompt context.
    pub context: GraphContext,
}

impl RetrievalReport {
    fn no_context() -> Self {
        Self {
            answer: NO_CONTEXT_ANSWER.to_string(),
            seeds: Vec::new(),
            subgraph: Vec::new(),
            context: GraphContext::default(),
        }
    }

    /// True when this is the empty-seed terminal response.
    pub fn is_no_context(&self) -> bool {
        self.seeds.is_empty()
    }
}

/// Answers queries over the ingested corpus.
pub struct Retriever {
    ctx: ServiceContext,
    config: RetrieveConfig,
}

impl Retriever {
    pub fn new(ctx: ServiceContext, config: RetrieveConfig) -> Self {
        Self { ctx, config }
    }

    pub fn config(&self) -> &RetrieveConfig {
        &self.config
    }

    /// Run the full retrieval pipeline for `query`.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalReport, RetrieveError> {
        let retry = self.config.retry;

        let vector = retry
            .run(
                || {
                    let embedder = Arc::clone(&self.ctx.embedder);
                    let query = query.to_owned();
                    async move { embedder.embed(&query).await }
                },
                EmbeddingError::is_transient,
            )
            .await?;

        let seeds = retry
            .run(
                || {
                    let vectors = Arc::clone(&self.ctx.vectors);
                    let vector = vector.clone();
                    let top_k = self.config.top_k;
                    async move { vectors.search(&vector, top_k).await }
                },
                VectorError::is_transient,
            )
            .await
            .map_err(RetrieveError::Search)?;

        if seeds.is_empty() {
            debug!("no seeds found, returning terminal answer");
            return Ok(RetrievalReport::no_context());
        }

        // Several hits can point at the same entity; expand each entity once,
        // in ranking order.
        let mut seed_ids = Vec::new();
        for hit in &seeds {
            if !seed_ids.contains(&hit.entity_id) {
                seed_ids.push(hit.entity_id);
            }
        }
        debug!(seeds = seeds.len(), entities = seed_ids.len(), "seeds found");

        let subgraph = retry
            .run(
                || {
                    let graph = Arc::clone(&self.ctx.graph);
                    let seed_ids = seed_ids.clone();
                    let hops = self.config.hops;
                    let limits = self.config.limits;
                    async move { graph.neighbors(&seed_ids, hops, &limits).await }
                },
                GraphError::is_transient,
            )
            .await
            .map_err(RetrieveError::Expansion)?;

        let context = GraphContext::from_triples(&subgraph);
        let prompt = AnswerPrompt::new(&context.nodes, &context.edges, query).generate();

        let answer = match retry
            .run(
                || {
                    let llm = Arc::clone(&self.ctx.llm);
                    let prompt = prompt.clone();
                    async move { llm.complete(&prompt).await }
                },
                LlmError::is_transient,
            )
            .await
        {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, "answer generation failed");
                format!("Error generating answer: {err}")
            }
        };

        Ok(RetrievalReport {
            answer,
            seeds,
            subgraph,
            context,
        })
    }
}
