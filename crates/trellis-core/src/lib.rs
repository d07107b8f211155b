//! Shared types for the trellis knowledge pipeline.
//!
//! This crate holds the vocabulary common to every other trellis crate: the
//! entity identity types that tie the graph store and the vector store
//! together, and the retry policy applied to network-bound calls.

pub mod retry;
pub mod types;

pub use retry::RetryPolicy;
pub use types::{Entity, EntityId, RelationTuple, Triple};
