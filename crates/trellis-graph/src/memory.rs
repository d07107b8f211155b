//! In-memory graph store implementation.
//!
//! Backed by a petgraph directed graph with a HashMap index for O(1) node
//! lookup by entity id. Useful for testing and small corpora.

use crate::{ExpansionLimits, GraphError, GraphResult, GraphStore, Hops};
use async_trait::async_trait;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use trellis_core::{Entity, EntityId, Triple};

struct GraphInner {
    graph: DiGraph<Entity, String>,
    /// Map from entity id to petgraph's internal index.
    index: HashMap<EntityId, NodeIndex>,
}

/// In-memory graph store.
///
/// Nodes are idempotent by entity id; relationships are appended, so parallel
/// edges of different types between the same pair are preserved.
pub struct MemoryGraphStore {
    inner: RwLock<GraphInner>,
}

impl MemoryGraphStore {
    /// Create an empty graph store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GraphInner {
                graph: DiGraph::new(),
                index: HashMap::new(),
            }),
        }
    }

    /// Name of the stored node, if registered.
    pub fn node_name(&self, id: &EntityId) -> Option<String> {
        let inner = self.inner.read().ok()?;
        let idx = inner.index.get(id)?;
        Some(inner.graph[*idx].name.clone())
    }

    /// Collect up to `fanout` incident edges of a node as stored triples.
    ///
    /// Walks outgoing edges first, then incoming. Edges whose far endpoint is
    /// `exclude` are skipped before the fanout budget is spent.
    fn incident(
        inner: &GraphInner,
        idx: NodeIndex,
        exclude: Option<NodeIndex>,
        fanout: usize,
    ) -> Vec<(NodeIndex, Triple)> {
        let mut out = Vec::new();

        for direction in [Direction::Outgoing, Direction::Incoming] {
            for edge in inner.graph.edges_directed(idx, direction) {
                if out.len() >= fanout {
                    return out;
                }

                let (source_idx, target_idx) = (edge.source(), edge.target());
                let other = if source_idx == idx {
                    target_idx
                } else {
                    source_idx
                };

                if Some(other) == exclude {
                    continue;
                }

                let triple = Triple::new(
                    inner.graph[source_idx].clone(),
                    edge.weight().clone(),
                    inner.graph[target_idx].clone(),
                );
                out.push((other, triple));
            }
        }

        out
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn upsert_node(&self, id: &EntityId, name: &str) -> GraphResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| GraphError::Connection(format!("graph lock poisoned: {}", e)))?;

        if inner.index.contains_key(id) {
            // Name stays as first registered
            return Ok(());
        }

        let idx = inner.graph.add_node(Entity::new(*id, name));
        inner.index.insert(*id, idx);
        Ok(())
    }

    async fn create_relationship(
        &self,
        source: &EntityId,
        target: &EntityId,
        rel_type: &str,
    ) -> GraphResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| GraphError::Connection(format!("graph lock poisoned: {}", e)))?;

        let source_idx = *inner
            .index
            .get(source)
            .ok_or(GraphError::MissingEndpoint(*source))?;
        let target_idx = *inner
            .index
            .get(target)
            .ok_or(GraphError::MissingEndpoint(*target))?;

        inner.graph.add_edge(source_idx, target_idx, rel_type.to_string());
        Ok(())
    }

    async fn neighbors(
        &self,
        seeds: &[EntityId],
        hops: Hops,
        limits: &ExpansionLimits,
    ) -> GraphResult<Vec<Triple>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| GraphError::Connection(format!("graph lock poisoned: {}", e)))?;

        let mut triples = Vec::new();
        let mut seen: HashSet<(EntityId, String, EntityId)> = HashSet::new();

        'seeds: for seed in seeds {
            let Some(&seed_idx) = inner.index.get(seed) else {
                // Seeds not present in the graph are skipped
                continue;
            };

            let first = Self::incident(&inner, seed_idx, None, limits.fanout_per_hop);
            let mut frontier = Vec::new();

            for (other, triple) in first {
                if !frontier.contains(&other) {
                    frontier.push(other);
                }
                if seen.insert((triple.source.id, triple.rel_type.clone(), triple.target.id)) {
                    triples.push(triple);
                    if triples.len() >= limits.max_triples {
                        break 'seeds;
                    }
                }
            }

            if hops == Hops::Two {
                for mid in frontier {
                    let second =
                        Self::incident(&inner, mid, Some(seed_idx), limits.fanout_per_hop);
                    for (_, triple) in second {
                        if seen.insert((
                            triple.source.id,
                            triple.rel_type.clone(),
                            triple.target.id,
                        )) {
                            triples.push(triple);
                            if triples.len() >= limits.max_triples {
                                break 'seeds;
                            }
                        }
                    }
                }
            }
        }

        Ok(triples)
    }

    async fn node_count(&self) -> GraphResult<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|e| GraphError::Connection(format!("graph lock poisoned: {}", e)))?;

        Ok(inner.graph.node_count())
    }

    async fn relationship_count(&self) -> GraphResult<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|e| GraphError::Connection(format!("graph lock poisoned: {}", e)))?;

        Ok(inner.graph.edge_count())
    }

    async fn health_check(&self) -> GraphResult<bool> {
        Ok(true)
    }
}
