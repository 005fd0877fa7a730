//! The traversed subgraph a single retrieval pass builds up as it hops
//! (spec §4.9 steps 5 and 11: which edges were followed, and which of them
//! survive between the memories that make the final cut).
//!
//! Grounded on the teacher's `cortex-causal::graph::stable_graph::IndexedGraph`:
//! petgraph node weights must implement `Copy`, and `MemoryId` (a `String`
//! newtype) does not, so ids live in a side table keyed off `NodeIndex`
//! rather than as the node weight itself. Unlike the teacher's causal graph,
//! connections here are undirected (spec §4.6), so this wraps `UnGraph`
//! rather than a directed `StableGraph`.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};

use mnemograph_core::connection::{Connection, ConnectionType};
use mnemograph_core::ids::MemoryId;

#[derive(Default)]
pub struct WorkingGraph {
    graph: UnGraph<MemoryId, (ConnectionType, f64)>,
    node_index: HashMap<MemoryId, NodeIndex>,
}

impl WorkingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, id: &MemoryId) -> NodeIndex {
        if let Some(idx) = self.node_index.get(id) {
            return *idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_index.insert(id.clone(), idx);
        idx
    }

    /// Record that a hop traversed `connection`. Idempotent: traversing the
    /// same typed edge twice in one pass (possible if two seeds converge on
    /// the same neighbor) does not duplicate the edge.
    pub fn record_edge(&mut self, connection: &Connection) {
        let a = self.ensure_node(&connection.memory_a_id);
        let b = self.ensure_node(&connection.memory_b_id);
        let already_recorded = self
            .graph
            .edges_connecting(a, b)
            .any(|e| e.weight().0 == connection.connection_type);
        if !already_recorded {
            self.graph
                .add_edge(a, b, (connection.connection_type, connection.weight));
        }
    }

    /// Every traversed edge whose endpoints both survive into `retained`.
    pub fn edges_among(&self, retained: &BTreeSet<MemoryId>) -> Vec<(MemoryId, MemoryId, ConnectionType, f64)> {
        let mut out = Vec::new();
        for edge in self.graph.edge_indices() {
            let (a, b) = self
                .graph
                .edge_endpoints(edge)
                .expect("edge_indices yields only live edges");
            let a_id = &self.graph[a];
            let b_id = &self.graph[b];
            if retained.contains(a_id) && retained.contains(b_id) {
                let (connection_type, weight) = self.graph[edge];
                out.push((a_id.clone(), b_id.clone(), connection_type, weight));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn connection(a: &str, b: &str) -> Connection {
        let now = Utc::now();
        Connection {
            memory_a_id: MemoryId::from_raw(a),
            memory_b_id: MemoryId::from_raw(b),
            connection_type: ConnectionType::Thematic,
            weight: 0.6,
            reason: "test".into(),
            created_at: now,
            last_coactivated_at: now,
        }
    }

    #[test]
    fn recording_the_same_edge_twice_does_not_duplicate_it() {
        let mut g = WorkingGraph::new();
        g.record_edge(&connection("mem_a", "mem_b"));
        g.record_edge(&connection("mem_a", "mem_b"));
        let retained: BTreeSet<MemoryId> =
            [MemoryId::from_raw("mem_a"), MemoryId::from_raw("mem_b")].into_iter().collect();
        assert_eq!(g.edges_among(&retained).len(), 1);
    }

    #[test]
    fn edges_among_excludes_pairs_with_a_dropped_endpoint() {
        let mut g = WorkingGraph::new();
        g.record_edge(&connection("mem_a", "mem_b"));
        let retained: BTreeSet<MemoryId> = [MemoryId::from_raw("mem_a")].into_iter().collect();
        assert!(g.edges_among(&retained).is_empty());
    }
}
