//! Language-model backends for relation extraction and grounded answering.
//!
//! The [`LlmBackend`] trait covers the two generation modes the pipeline
//! needs: free-form completion for answers and JSON-constrained completion
//! for structured relation extraction. [`OllamaBackend`] talks to a local
//! Ollama server; [`MockBackend`] serves canned responses for tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_llm::{ExtractionProfile, LlmBackend, LlmConfig, OllamaBackend, StructuredOutcome};
//!
//! let backend = OllamaBackend::localhost();
//! match backend.extract_relations("Insulin regulates blood sugar.", ExtractionProfile::General).await? {
//!     StructuredOutcome::Parsed(graph) => println!("{} relations", graph.graph.len()),
//!     StructuredOutcome::Malformed { reason, .. } => println!("rejected: {reason}"),
//! }
//! ```

pub mod backend;
pub mod ollama;
pub mod prompt;
pub mod types;

pub use backend::{LlmBackend, LlmConfig, LlmError, LlmResult, MockBackend};
pub use ollama::OllamaBackend;
pub use prompt::{AnswerPrompt, ExtractionProfile, PromptTemplate, RelationPrompt};
pub use types::{parse_relation_graph, RawTriple, RelationGraph, StructuredOutcome};
