//! # Trellis RAG
//!
//! The two pipelines that tie the trellis stores together.
//!
//! **Ingestion** turns a document into persisted state: relations are
//! extracted with an LLM, entity labels get stable ids, nodes and typed
//! relationships land in the graph store, and newline-delimited chunks are
//! embedded into the vector store tagged with the entity they mention.
//!
//! **Retrieval** answers a query over that state: the query is embedded,
//! the nearest stored chunks yield seed entities, the seeds are expanded
//! into a bounded subgraph, and the flattened subgraph grounds a generated
//! answer. When the search finds nothing, retrieval stops early with a
//! fixed terminal answer.
//!
//! Both pipelines take their services through [`ServiceContext`] and apply
//! one [`RetryPolicy`](trellis_core::RetryPolicy) to every network-bound
//! step.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis_rag::{IngestConfig, IngestPipeline, RetrieveConfig, Retriever, ServiceContext};
//!
//! let ctx = ServiceContext::new(llm, embedder, graph, vectors);
//! let report = IngestPipeline::new(ctx.clone(), IngestConfig::default())
//!     .ingest("Insulin regulates blood sugar.\nThe pancreas produces insulin.")
//!     .await?;
//! println!("{} entities, {} relationships", report.entities, report.relationships);
//!
//! let answer = Retriever::new(ctx, RetrieveConfig::default())
//!     .retrieve("What produces insulin?")
//!     .await?;
//! println!("{}", answer.answer);
//! ```

pub mod assemble;
pub mod chunk;
pub mod context;
pub mod extract;
pub mod ingest;
pub mod registry;
pub mod retrieve;

pub use assemble::GraphContext;
pub use chunk::{associate_chunks, split_chunks, TaggedChunk};
pub use context::ServiceContext;
pub use extract::{ExtractError, Extractor};
pub use ingest::{IngestConfig, IngestError, IngestPipeline, IngestReport, IngestStep};
pub use registry::{NodeRegistry, RegisteredBatch};
pub use retrieve::{
    RetrievalReport, RetrieveConfig, RetrieveError, Retriever, NO_CONTEXT_ANSWER,
};
