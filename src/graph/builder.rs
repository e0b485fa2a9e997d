//! Graph construction module

use crate::graph::TreeEdge;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

/// Undirected view of a committed edge set, keyed by site id
#[derive(Debug, Clone)]
pub struct TreeGraph {
    /// Underlying graph; node weights are site ids, edge weights are costs
    pub graph: UnGraph<u32, f64>,

    /// Mapping from site ids to graph indices
    pub id_to_index: HashMap<u32, NodeIndex>,
}

impl TreeGraph {
    pub fn index_of(&self, id: u32) -> Option<NodeIndex> {
        self.id_to_index.get(&id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Builder for incrementally constructing a [`TreeGraph`]
pub struct TreeGraphBuilder {
    graph: UnGraph<u32, f64>,
    id_to_index: HashMap<u32, NodeIndex>,
}

impl TreeGraphBuilder {
    /// Create a new builder with room for `capacity` sites
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(capacity, capacity),
            id_to_index: HashMap::with_capacity(capacity),
        }
    }

    /// Get or create the graph node for a site id
    pub fn get_or_create_node(&mut self, id: u32) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(&id) {
            return idx;
        }

        let idx = self.graph.add_node(id);
        self.id_to_index.insert(id, idx);
        idx
    }

    /// Add an undirected link between two sites
    pub fn add_edge(&mut self, edge: &TreeEdge) {
        let src = self.get_or_create_node(edge.src);
        let dst = self.get_or_create_node(edge.dst);
        self.graph.add_edge(src, dst, edge.cost);
    }

    /// Add every edge from a slice
    pub fn extend_edges(&mut self, edges: &[TreeEdge]) {
        for edge in edges {
            self.add_edge(edge);
        }
    }

    pub fn build(self) -> TreeGraph {
        TreeGraph {
            graph: self.graph,
            id_to_index: self.id_to_index,
        }
    }
}
