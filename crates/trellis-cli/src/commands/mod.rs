//! CLI command implementations.

pub mod ask;
pub mod check;
pub mod ingest;
pub mod init;
pub mod stats;

use crate::config::TrellisConfig;
use anyhow::Result;
use std::sync::Arc;
use trellis_embeddings::OllamaEmbedder;
use trellis_llm::{LlmConfig, OllamaBackend};
use trellis_rag::ServiceContext;

/// Build the service context from config.
///
/// Store connections are lazy, so this never touches the network; the first
/// pipeline call does.
pub fn build_context(config: &TrellisConfig) -> Result<ServiceContext> {
    let llm_config = LlmConfig::default()
        .with_model(&config.llm.model)
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens)
        .with_timeout(config.llm.timeout_secs);
    let llm = OllamaBackend::with_config(&config.llm.endpoint, llm_config);

    let embedder = OllamaEmbedder::with_timeout(
        &config.embedding.endpoint,
        &config.embedding.model,
        config.embedding.dimension,
        config.embedding.timeout_secs,
    )?;

    let graph = trellis_graph::create_store(config.graph.clone())?;
    let vectors = trellis_vectors::create_store(config.vectors.clone())?;

    Ok(ServiceContext::new(
        Arc::new(llm),
        Arc::new(embedder),
        Arc::from(graph),
        Arc::from(vectors),
    ))
}
