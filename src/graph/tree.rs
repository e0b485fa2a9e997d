//! Access tree produced for one hub group

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A committed link, either a merge (`src` hangs off `dst`) or a hub attachment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeEdge {
    pub src: u32,
    pub dst: u32,
    pub cost: f64,
}

impl TreeEdge {
    pub fn new(src: u32, dst: u32, cost: f64) -> Self {
        Self { src, dst, cost }
    }
}

/// Residual bound violation left after the direct-attachment fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A terminal sits deeper than the hop limit
    HopLimit { node: u32, hops: u32, limit: u32 },

    /// A hub-attached sub-tree carries more than the weight capacity
    Overweight {
        subtree_root: u32,
        weight: f64,
        capacity: f64,
    },

    /// A terminal has no path to the hub
    Unreachable { node: u32 },
}

/// Spanning tree connecting every terminal of a group to its hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTree {
    /// Hub id, root of the tree
    pub hub: u32,

    /// Sum of all edge costs
    pub total_cost: f64,

    /// Edges in commit order: merges first, then hub attachments
    pub edges: Vec<TreeEdge>,

    /// Hops from the hub, recomputed by BFS; the hub maps to 0
    pub hop_count: BTreeMap<u32, u32>,

    /// Neighbour one hop closer to the hub, for every reachable terminal
    pub parent: BTreeMap<u32, u32>,

    /// Bound violations the fallback could not avoid
    pub violations: Vec<Violation>,
}

impl AccessTree {
    /// Tree for a group without terminals
    pub fn empty(hub: u32) -> Self {
        Self {
            hub,
            total_cost: 0.0,
            edges: Vec::new(),
            hop_count: BTreeMap::from([(hub, 0)]),
            parent: BTreeMap::new(),
            violations: Vec::new(),
        }
    }

    /// Deepest hop count in the tree
    pub fn max_hop(&self) -> u32 {
        self.hop_count.values().copied().max().unwrap_or(0)
    }

    /// Number of terminals attached directly to the hub
    pub fn hub_degree(&self) -> usize {
        self.edges.iter().filter(|e| e.dst == self.hub).count()
    }

    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}
