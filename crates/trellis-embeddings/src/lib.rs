//! # Trellis Embeddings
//!
//! Embedding backends for trellis semantic retrieval.
//!
//! This crate converts text to dense vectors so chunks and queries can be
//! compared by similarity in a vector store. The production backend talks to
//! an Ollama embedding model; [`MockEmbedder`] provides deterministic vectors
//! for tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trellis_embeddings::{Embedder, OllamaEmbedder};
//!
//! let embedder = OllamaEmbedder::localhost()?;
//! let vector = embedder.embed("cell membrane transport").await?;
//! assert_eq!(vector.len(), embedder.dimension());
//! ```

mod embedder;
mod mock;
mod ollama;

pub use embedder::{Embedder, EmbeddingError, EmbeddingResult};
pub use mock::MockEmbedder;
pub use ollama::OllamaEmbedder;
