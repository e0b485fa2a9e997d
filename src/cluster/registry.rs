//! Union-find registry of terminal clusters

use crate::cluster::Cluster;
use crate::data::Site;
use crate::error::PlanError;
use std::collections::BTreeSet;

/// Disjoint-set registry over terminals with per-root aggregate state
///
/// Terminals are addressed by dense index. Indices follow ascending site id,
/// so iterating roots in index order also iterates them in id order.
#[derive(Debug, Clone)]
pub struct ClusterRegistry {
    /// Site id of each terminal
    ids: Vec<u32>,

    /// Parent pointers (parent[i] = parent of terminal i)
    parent: Vec<usize>,

    /// Hops from the hub along tentatively committed edges
    hop_count: Vec<u32>,

    /// Aggregate state, present only at cluster roots
    clusters: Vec<Option<Cluster>>,

    /// Roots still eligible for merging
    active: BTreeSet<usize>,
}

impl ClusterRegistry {
    /// One singleton cluster per terminal; `terminals` must be sorted by id
    pub fn new(terminals: &[Site]) -> Self {
        let size = terminals.len();
        Self {
            ids: terminals.iter().map(|t| t.id).collect(),
            parent: (0..size).collect(),
            hop_count: vec![1; size],
            clusters: terminals
                .iter()
                .enumerate()
                .map(|(idx, t)| Some(Cluster::singleton(idx, t.weight)))
                .collect(),
            active: (0..size).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Site id of a terminal index
    pub fn id(&self, idx: usize) -> u32 {
        self.ids[idx]
    }

    /// Find the root of the cluster containing `idx`, compressing the path
    pub fn find(&mut self, mut idx: usize) -> usize {
        let mut root = idx;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[idx] != idx {
            let next = self.parent[idx];
            self.parent[idx] = root;
            idx = next;
        }

        root
    }

    /// Merge the cluster rooted at `root_i` into the one rooted at `root_j`
    ///
    /// Every absorbed member's hop count moves by `hop_increment`. Nothing is
    /// modified when either root is defunct or the roots coincide.
    pub fn union(&mut self, root_i: usize, root_j: usize, hop_increment: i64) -> Result<(), PlanError> {
        if root_i == root_j {
            return Err(PlanError::SelfMerge(self.id(root_i)));
        }
        if !self.is_active(root_j) {
            return Err(PlanError::DefunctCluster(self.id(root_j)));
        }
        let absorbed = self.clusters[root_i]
            .take()
            .ok_or_else(|| PlanError::DefunctCluster(self.id(root_i)))?;
        self.active.remove(&root_i);

        for &member in &absorbed.members {
            self.hop_count[member] = shift_hop(self.hop_count[member], hop_increment);
        }
        self.parent[root_i] = root_j;

        if let Some(target) = self.clusters[root_j].as_mut() {
            target.members.extend_from_slice(&absorbed.members);
            target.weight += absorbed.weight;
            target.max_hop = target
                .max_hop
                .max(shift_hop(absorbed.max_hop, hop_increment));
        }

        Ok(())
    }

    /// Roots of the clusters still eligible for merging, in id order
    pub fn active_roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.active.iter().copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, root: usize) -> bool {
        self.active.contains(&root)
    }

    /// Aggregate state of the cluster rooted at `root`
    pub fn cluster(&self, root: usize) -> Option<&Cluster> {
        self.clusters.get(root).and_then(Option::as_ref)
    }

    pub fn hop(&self, idx: usize) -> u32 {
        self.hop_count[idx]
    }

    /// Overwrite a terminal's hop count with an authoritative value
    pub fn set_hop(&mut self, idx: usize, hops: u32) {
        self.hop_count[idx] = hops;
    }
}

fn shift_hop(hop: u32, increment: i64) -> u32 {
    let shifted = (i64::from(hop) + increment).clamp(0, i64::from(u32::MAX));
    u32::try_from(shifted).unwrap_or(u32::MAX)
}
