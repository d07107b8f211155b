//! Context assembly: flatten an expanded subgraph into prompt-ready text.

use serde::Serialize;
use std::collections::HashSet;
use trellis_core::Triple;

/// Deduplicated node names and rendered edge lines from a subgraph.
///
/// Node order is first appearance across the triples, so assembly is
/// deterministic for a given expansion result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphContext {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

impl GraphContext {
    /// Assemble a context from expanded triples.
    ///
    /// Each triple contributes its source and target names (deduplicated)
    /// and one `source rel_type target` edge line.
    pub fn from_triples(triples: &[Triple]) -> Self {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        let mut edges = Vec::with_capacity(triples.len());

        for triple in triples {
            for name in [&triple.source.name, &triple.target.name] {
                if seen.insert(name.clone()) {
                    nodes.push(name.clone());
                }
            }
            edges.push(triple.to_string());
        }

        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{Entity, EntityId};

    fn triple(source: &str, rel: &str, target: &str) -> Triple {
        Triple::new(
            Entity::new(EntityId::new(), source),
            rel,
            Entity::new(EntityId::new(), target),
        )
    }

    #[test]
    fn test_nodes_deduplicated_in_first_appearance_order() {
        let triples = vec![triple("A", "causes", "B"), triple("B", "causes", "C")];
        let context = GraphContext::from_triples(&triples);
        assert_eq!(context.nodes, vec!["A", "B", "C"]);
        assert_eq!(context.edges, vec!["A causes B", "B causes C"]);
    }

    #[test]
    fn test_empty_subgraph_is_empty_context() {
        let context = GraphContext::from_triples(&[]);
        assert!(context.is_empty());
    }

    #[test]
    fn test_parallel_edges_both_rendered() {
        let triples = vec![triple("A", "causes", "B"), triple("A", "precedes", "B")];
        let context = GraphContext::from_triples(&triples);
        assert_eq!(context.nodes, vec!["A", "B"]);
        assert_eq!(context.edges.len(), 2);
    }
}
