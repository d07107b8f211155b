//! Node registration: stable identifiers for extracted entity labels.
//!
//! Extraction emits entity names as free text, and the same name routinely
//! appears in several triples. Registration assigns each distinct label one
//! [`EntityId`], first seen wins, so every downstream write refers to the
//! same node.

use std::collections::HashMap;
use trellis_core::{EntityId, RelationTuple};
use trellis_llm::RawTriple;

/// Maps entity labels to their assigned identifiers.
///
/// Labels are registered in first-seen order, which [`entries`] preserves.
/// Lookups are exact (case-sensitive): extraction is expected to emit
/// consistent casing within one batch.
///
/// [`entries`]: NodeRegistry::entries
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    ids: HashMap<String, EntityId>,
    order: Vec<String>,
}

/// The result of registering one extraction batch.
#[derive(Debug, Clone)]
pub struct RegisteredBatch {
    /// Every distinct label with its assigned id.
    pub registry: NodeRegistry,
    /// Id-level relation tuples for triples with both endpoints and a type.
    pub tuples: Vec<RelationTuple>,
    /// Triples dropped for lacking a target or a relationship type.
    pub skipped: usize,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every label in `triples` and resolve the complete triples
    /// into id-level tuples.
    ///
    /// Source labels are always registered, target labels whenever present,
    /// so a dangling triple still contributes its node. A tuple is produced
    /// only when both the target and the relationship type are present.
    pub fn from_triples(triples: &[RawTriple]) -> RegisteredBatch {
        let mut registry = Self::new();
        let mut tuples = Vec::new();
        let mut skipped = 0;

        for triple in triples {
            let source = registry.register(&triple.node);
            let target = triple
                .target_node
                .as_deref()
                .map(|name| registry.register(name));

            match (target, triple.relationship.as_deref()) {
                (Some(target), Some(rel_type)) => tuples.push(RelationTuple {
                    source,
                    target,
                    rel_type: rel_type.to_string(),
                }),
                _ => skipped += 1,
            }
        }

        RegisteredBatch {
            registry,
            tuples,
            skipped,
        }
    }

    /// Register a label, returning its id. Idempotent per label.
    pub fn register(&mut self, name: &str) -> EntityId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = EntityId::new();
        self.ids.insert(name.to_string(), id);
        self.order.push(name.to_string());
        id
    }

    /// Look up the id assigned to a label.
    pub fn resolve(&self, name: &str) -> Option<EntityId> {
        self.ids.get(name).copied()
    }

    /// Iterate `(label, id)` pairs in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, EntityId)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.ids[name]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_label_registers_once() {
        let triples = vec![
            RawTriple::new("A", "B", "causes"),
            RawTriple::new("B", "C", "causes"),
        ];
        let batch = NodeRegistry::from_triples(&triples);
        assert_eq!(batch.registry.len(), 3);
        assert_eq!(batch.tuples.len(), 2);
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.tuples[0].source, batch.registry.resolve("A").unwrap());
        assert_eq!(batch.tuples[0].target, batch.registry.resolve("B").unwrap());
        assert_eq!(batch.tuples[1].source, batch.registry.resolve("B").unwrap());
    }

    #[test]
    fn test_entries_preserve_first_seen_order() {
        let triples = vec![
            RawTriple::new("B", "A", "follows"),
            RawTriple::new("C", "A", "follows"),
        ];
        let batch = NodeRegistry::from_triples(&triples);
        let names: Vec<&str> = batch.registry.entries().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_dangling_triple_registers_node_but_no_tuple() {
        let triples = vec![RawTriple {
            node: "orphan".to_string(),
            target_node: None,
            relationship: None,
        }];
        let batch = NodeRegistry::from_triples(&triples);
        assert_eq!(batch.registry.len(), 1);
        assert!(batch.tuples.is_empty());
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn test_target_without_relationship_still_registers_target() {
        let triples = vec![RawTriple {
            node: "A".to_string(),
            target_node: Some("B".to_string()),
            relationship: None,
        }];
        let batch = NodeRegistry::from_triples(&triples);
        assert_eq!(batch.registry.len(), 2);
        assert!(batch.registry.resolve("B").is_some());
        assert!(batch.tuples.is_empty());
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn test_repeated_label_keeps_first_id() {
        let mut registry = NodeRegistry::new();
        let first = registry.register("Insulin");
        let second = registry.register("Insulin");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let batch = NodeRegistry::from_triples(&[]);
        assert!(batch.registry.is_empty());
        assert!(batch.tuples.is_empty());
        assert_eq!(batch.skipped, 0);
    }
}
