//! Identity and relationship types shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an entity in the knowledge graph.
///
/// The same id tags the entity's node in the graph store and the embedding
/// points derived from text mentioning it, so either store can be joined back
/// to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A named node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A directed, typed relationship resolved to entity identifiers.
///
/// Both endpoints must be persisted as entities before the relationship is
/// written to the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationTuple {
    pub source: EntityId,
    pub target: EntityId,
    pub rel_type: String,
}

/// A subgraph edge with both endpoints materialized.
///
/// Always in stored orientation: `source` and `target` match the direction
/// the relationship was persisted with, regardless of which direction a
/// traversal entered the edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub source: Entity,
    pub rel_type: String,
    pub target: Entity,
}

impl Triple {
    pub fn new(source: Entity, rel_type: impl Into<String>, target: Entity) -> Self {
        Self {
            source,
            rel_type: rel_type.into(),
            target,
        }
    }

    /// Identity used to deduplicate expansion results.
    pub fn key(&self) -> (EntityId, &str, EntityId) {
        (self.source.id, self.rel_type.as_str(), self.target.id)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.source.name, self.rel_type, self.target.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn entity_id_roundtrips_through_display() {
        let id = EntityId::new();
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn triple_renders_as_edge_text() {
        let a = Entity::new(EntityId::new(), "Insulin");
        let b = Entity::new(EntityId::new(), "Blood Sugar");
        let triple = Triple::new(a, "regulates", b);
        assert_eq!(triple.to_string(), "Insulin regulates Blood Sugar");
    }

    #[test]
    fn triple_key_ignores_names() {
        let id_a = EntityId::new();
        let id_b = EntityId::new();
        let t1 = Triple::new(
            Entity::new(id_a, "A"),
            "causes",
            Entity::new(id_b, "B"),
        );
        let t2 = Triple::new(
            Entity::new(id_a, "A (alias)"),
            "causes",
            Entity::new(id_b, "B (alias)"),
        );
        assert_eq!(t1.key(), t2.key());
    }
}
