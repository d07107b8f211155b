//! Wire schema for structured relation extraction.

use serde::{Deserialize, Serialize};

/// One extracted relation as emitted by the model.
///
/// `target_node` and `relationship` are optional because models regularly
/// emit dangling nodes; downstream registration keeps the node and skips the
/// edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTriple {
    pub node: String,
    #[serde(default)]
    pub target_node: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
}

impl RawTriple {
    pub fn new(node: impl Into<String>, target_node: impl Into<String>, relationship: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            target_node: Some(target_node.into()),
            relationship: Some(relationship.into()),
        }
    }
}

/// The object shape the structured-generation call must satisfy:
/// `{"graph": [{"node", "target_node", "relationship"}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationGraph {
    pub graph: Vec<RawTriple>,
}

/// Outcome of validating a structured-generation response.
///
/// Validation sits between generation and consumption: callers never see an
/// unvalidated shape, and malformed output keeps the raw text for diagnostics
/// and retry decisions.
#[derive(Debug, Clone)]
pub enum StructuredOutcome {
    /// Response parsed and validated against the schema.
    Parsed(RelationGraph),
    /// Response failed validation.
    Malformed { raw: String, reason: String },
}

/// Validate a raw model response against the relation-graph schema.
///
/// JSON-mode responses are usually clean, but models still occasionally wrap
/// the object in markdown fences or leading prose, so one brace-delimited
/// slice is recovered before giving up.
pub fn parse_relation_graph(raw: &str) -> StructuredOutcome {
    match serde_json::from_str::<RelationGraph>(raw.trim()) {
        Ok(graph) => StructuredOutcome::Parsed(graph),
        Err(first_err) => match extract_json_object(raw) {
            Some(slice) => match serde_json::from_str::<RelationGraph>(slice) {
                Ok(graph) => StructuredOutcome::Parsed(graph),
                Err(e) => StructuredOutcome::Malformed {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                },
            },
            None => StructuredOutcome::Malformed {
                raw: raw.to_string(),
                reason: first_err.to_string(),
            },
        },
    }
}

/// Find the outermost brace-delimited object in possibly fenced output.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
