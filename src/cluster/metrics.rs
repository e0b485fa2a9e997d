//! Per-tree statistics and constraint replay

use crate::data::GroupRecord;
use crate::graph::AccessTree;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Load carried by one hub-attached sub-tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtreeLoad {
    /// Terminal linked directly to the hub
    pub root: u32,

    /// Total weight of the sub-tree, root included
    pub weight: f64,

    /// Number of terminals in the sub-tree
    pub members: usize,

    /// Deepest hop count inside the sub-tree
    pub depth: u32,
}

/// Headline numbers for one planned group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSummary {
    pub hub: u32,
    pub terminals: usize,
    pub total_cost: f64,
    pub max_hop: u32,
    pub subtrees: usize,
    pub heaviest_subtree: f64,
    pub violations: usize,
}

/// Aggregate weight and depth of every hub-attached sub-tree
///
/// Each terminal is assigned to the sub-tree whose root its parent chain
/// reaches just before the hub.
pub fn subtree_loads(tree: &AccessTree, group: &GroupRecord) -> Vec<SubtreeLoad> {
    let mut loads: BTreeMap<u32, SubtreeLoad> = BTreeMap::new();

    for terminal in &group.terminals {
        let Some(root) = subtree_root(tree, terminal.id) else {
            continue;
        };
        let depth = tree.hop_count.get(&terminal.id).copied().unwrap_or(0);

        let load = loads.entry(root).or_insert(SubtreeLoad {
            root,
            weight: 0.0,
            members: 0,
            depth: 0,
        });
        load.weight += terminal.weight;
        load.members += 1;
        load.depth = load.depth.max(depth);
    }

    loads.into_values().collect()
}

fn subtree_root(tree: &AccessTree, id: u32) -> Option<u32> {
    let mut current = id;
    // A parent chain longer than the tree itself means a cycle
    for _ in 0..=tree.parent.len() {
        let parent = *tree.parent.get(&current)?;
        if parent == tree.hub {
            return Some(current);
        }
        current = parent;
    }
    None
}

/// Replay merge edges in commit order and return the heaviest cluster formed
///
/// Hub attachments are skipped, and so are singletons: a tree without
/// merges has a peak load of zero.
pub fn replay_peak_load(tree: &AccessTree, group: &GroupRecord) -> f64 {
    let index: HashMap<u32, usize> = group
        .terminals
        .iter()
        .enumerate()
        .map(|(idx, t)| (t.id, idx))
        .collect();
    let mut weights: Vec<f64> = group.terminals.iter().map(|t| t.weight).collect();
    let mut sets = UnionFind::<usize>::new(weights.len());
    let mut peak: f64 = 0.0;

    for edge in tree.edges.iter().filter(|e| e.dst != tree.hub) {
        let (Some(&a), Some(&b)) = (index.get(&edge.src), index.get(&edge.dst)) else {
            continue;
        };
        let (root_a, root_b) = (sets.find(a), sets.find(b));
        if root_a == root_b {
            continue;
        }

        let merged = weights[root_a] + weights[root_b];
        sets.union(root_a, root_b);
        weights[sets.find(root_a)] = merged;
        peak = peak.max(merged);
    }

    peak
}

/// Summarize one planned group
pub fn summarize(tree: &AccessTree, group: &GroupRecord) -> TreeSummary {
    let loads = subtree_loads(tree, group);
    TreeSummary {
        hub: tree.hub,
        terminals: group.terminals.len(),
        total_cost: tree.total_cost,
        max_hop: tree.max_hop(),
        subtrees: loads.len(),
        heaviest_subtree: loads.iter().map(|l| l.weight).fold(0.0, f64::max),
        violations: tree.violations.len(),
    }
}
