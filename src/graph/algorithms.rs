//! Graph algorithms over committed edge sets

use crate::data::Site;
use crate::graph::{TreeEdge, TreeGraph, TreeGraphBuilder};
use petgraph::algo::{connected_components, is_cyclic_undirected};
use petgraph::visit::Bfs;
use std::collections::{BTreeMap, HashMap};

/// Hop distance from the hub to every site reachable over the edge set
///
/// A hub with no incident edge yields a map holding only the hub itself.
pub fn hop_counts(graph: &TreeGraph, hub: u32) -> HashMap<u32, u32> {
    let Some(start) = graph.index_of(hub) else {
        return HashMap::from([(hub, 0)]);
    };

    // Every node is visited after the neighbour that discovered it
    let mut depth = HashMap::from([(start, 0u32)]);
    let mut bfs = Bfs::new(&graph.graph, start);
    while let Some(idx) = bfs.next(&graph.graph) {
        let next = depth[&idx] + 1;
        for neighbor in graph.graph.neighbors(idx) {
            depth.entry(neighbor).or_insert(next);
        }
    }

    depth
        .into_iter()
        .map(|(idx, hops)| (graph.graph[idx], hops))
        .collect()
}

/// Neighbour one hop closer to the hub, for every reachable non-hub site
pub fn parent_map(graph: &TreeGraph, hops: &HashMap<u32, u32>, hub: u32) -> BTreeMap<u32, u32> {
    let mut parents = BTreeMap::new();

    for (&id, &depth) in hops {
        if id == hub || depth == 0 {
            continue;
        }
        let Some(idx) = graph.index_of(id) else {
            continue;
        };

        // In a tree exactly one neighbour qualifies; min keeps it stable otherwise
        let parent = graph
            .graph
            .neighbors(idx)
            .map(|n| graph.graph[n])
            .filter(|n| hops.get(n) == Some(&(depth - 1)))
            .min();

        if let Some(parent) = parent {
            parents.insert(id, parent);
        }
    }

    parents
}

/// Check that `edges` form a spanning tree over the hub and all terminals
pub fn is_spanning_tree(edges: &[TreeEdge], hub: &Site, terminals: &[Site]) -> bool {
    if edges.len() != terminals.len() {
        return false;
    }

    let mut builder = TreeGraphBuilder::with_capacity(terminals.len() + 1);
    builder.get_or_create_node(hub.id);
    for terminal in terminals {
        builder.get_or_create_node(terminal.id);
    }
    builder.extend_edges(edges);
    let graph = builder.build();

    // Edges naming unknown sites would have added nodes
    if graph.node_count() != terminals.len() + 1 {
        return false;
    }

    connected_components(&graph.graph) == 1 && !is_cyclic_undirected(&graph.graph)
}
