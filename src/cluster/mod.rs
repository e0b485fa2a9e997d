//! Constrained clustering of terminals into hub-attached sub-trees

pub mod engine;
pub mod metrics;
pub mod registry;
pub mod tradeoff;

pub use engine::{build_access_tree, plan_groups, MergeEngine};
pub use registry::ClusterRegistry;
pub use tradeoff::{Tradeoff, TradeoffEvaluator};

/// A group of interconnected terminals not yet attached to the hub
///
/// Terminals are referred to by their dense index in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Union-find representative; the member that will link towards the hub
    pub root: usize,

    /// Member indices, root included
    pub members: Vec<usize>,

    /// Sum of member weights
    pub weight: f64,

    /// Greatest hop count among members
    pub max_hop: u32,
}

impl Cluster {
    /// Singleton cluster for one terminal hanging directly off the hub
    pub fn singleton(idx: usize, weight: f64) -> Self {
        Self {
            root: idx,
            members: vec![idx],
            weight,
            max_hop: 1,
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }
}
