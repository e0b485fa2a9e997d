//! Greedy Esau-Williams merge loop with weight and hop bounds

use crate::cluster::tradeoff::feasible_merge;
use crate::cluster::{ClusterRegistry, Tradeoff, TradeoffEvaluator};
use crate::config::Config;
use crate::data::{GroupRecord, Site};
use crate::error::PlanError;
use crate::graph::algorithms::{hop_counts, parent_map};
use crate::graph::{euclidean_distance, AccessTree, TreeEdge, TreeGraphBuilder, Violation};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};

/// Lifecycle of the merge loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Halted,
}

/// Outcome of a single iteration of the merge loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// A merge was committed along this edge
    Committed(TreeEdge),

    /// The selected trade-off went stale and was dropped
    Invalidated { source: u32 },

    /// No positive feasible trade-off remains
    Halted,
}

/// Merge engine for one hub group
pub struct MergeEngine {
    hub: Site,
    registry: ClusterRegistry,
    evaluator: TradeoffEvaluator,

    /// Cached best trade-off per source terminal still able to initiate a merge
    tradeoffs: BTreeMap<usize, Option<Tradeoff>>,

    edges: Vec<TreeEdge>,
    state: EngineState,
}

impl MergeEngine {
    /// Validate the group and seed one singleton cluster per terminal
    pub fn new(group: &GroupRecord, config: &Config) -> Result<Self, PlanError> {
        config.validate()?;
        group.hub.validate_position()?;

        let mut terminals = group.terminals.clone();
        terminals.sort_by_key(|t| t.id);

        let mut seen = HashSet::with_capacity(terminals.len());
        for terminal in &terminals {
            terminal.validate()?;
            if terminal.id == group.hub.id {
                return Err(PlanError::HubCollision(terminal.id));
            }
            if !seen.insert(terminal.id) {
                return Err(PlanError::DuplicateId(terminal.id));
            }
        }

        let registry = ClusterRegistry::new(&terminals);
        let evaluator = TradeoffEvaluator::new(&group.hub, terminals, *config);

        let mut engine = Self {
            hub: group.hub,
            registry,
            evaluator,
            tradeoffs: BTreeMap::new(),
            edges: Vec::new(),
            state: EngineState::Running,
        };

        for idx in 0..engine.registry.len() {
            let tradeoff = engine.evaluator.compute_tradeoff(&mut engine.registry, idx);
            engine.tradeoffs.insert(idx, tradeoff);
        }

        Ok(engine)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn registry(&self) -> &ClusterRegistry {
        &self.registry
    }

    /// Edges committed so far
    pub fn edges(&self) -> &[TreeEdge] {
        &self.edges
    }

    /// Globally best cached trade-off: largest value, then lowest source, then lowest target
    fn select(&self) -> Option<Tradeoff> {
        let mut best: Option<Tradeoff> = None;
        for tradeoff in self.tradeoffs.values().flatten() {
            if tradeoff.value <= 0.0 {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => {
                    tradeoff.value > b.value
                        || (tradeoff.value == b.value
                            && (tradeoff.source, tradeoff.target) < (b.source, b.target))
                }
            };
            if better {
                best = Some(*tradeoff);
            }
        }
        best
    }

    /// Run one iteration of the loop
    pub fn step(&mut self) -> Result<Step, PlanError> {
        if self.state == EngineState::Halted {
            return Ok(Step::Halted);
        }

        let Some(selected) = self.select() else {
            self.state = EngineState::Halted;
            return Ok(Step::Halted);
        };
        let Tradeoff { source, target, .. } = selected;

        // Cached values may predate merges involving either party; the
        // target may since have joined another cluster
        let root_i = self.registry.find(source);
        let root_j = self.registry.find(target);
        let plan = if root_i != root_j
            && self.registry.is_active(root_i)
            && self.registry.is_active(root_j)
        {
            feasible_merge(
                &self.registry,
                root_i,
                target,
                root_j,
                self.evaluator.config(),
            )
        } else {
            None
        };

        let Some(plan) = plan else {
            log::trace!(
                "Dropping stale trade-off {} -> {}",
                self.registry.id(source),
                self.registry.id(target)
            );
            self.tradeoffs.insert(source, None);
            return Ok(Step::Invalidated {
                source: self.registry.id(source),
            });
        };

        let edge = TreeEdge::new(
            self.registry.id(source),
            self.registry.id(target),
            self.evaluator.cost(source, target),
        );
        self.registry.union(root_i, root_j, plan.hop_increment)?;
        self.edges.push(edge);

        log::debug!(
            "Merged {} into {} (savings {:.4}, weight {}, max hop {})",
            edge.src,
            edge.dst,
            selected.value,
            plan.weight,
            plan.max_hop
        );

        // Only the surviving cluster's partners changed; it is re-anchored at its root
        self.tradeoffs.remove(&source);
        let refreshed = self.evaluator.compute_tradeoff(&mut self.registry, root_j);
        self.tradeoffs.insert(root_j, refreshed);

        Ok(Step::Committed(edge))
    }

    /// Iterate until no positive feasible trade-off remains
    pub fn run(&mut self) -> Result<(), PlanError> {
        while self.step()? != Step::Halted {}
        Ok(())
    }

    /// Attach every remaining cluster to the hub and recompute hops by BFS
    pub fn finalize(mut self) -> AccessTree {
        let config = *self.evaluator.config();
        let hub_id = self.hub.id;

        let roots: Vec<usize> = self.registry.active_roots().collect();
        for &root in &roots {
            self.edges.push(TreeEdge::new(
                self.registry.id(root),
                hub_id,
                self.evaluator.hub_cost(root),
            ));
        }

        let mut builder = TreeGraphBuilder::with_capacity(self.registry.len() + 1);
        builder.extend_edges(&self.edges);
        let graph = builder.build();

        let bfs = hop_counts(&graph, hub_id);
        let parent = parent_map(&graph, &bfs, hub_id);

        let mut hop_count = BTreeMap::from([(hub_id, 0)]);
        let mut violations = Vec::new();

        for idx in 0..self.registry.len() {
            let id = self.registry.id(idx);
            let Some(&hops) = bfs.get(&id) else {
                violations.push(Violation::Unreachable { node: id });
                continue;
            };

            if hops != self.registry.hop(idx) {
                log::debug!(
                    "Corrected hop count of {} from {} to {}",
                    id,
                    self.registry.hop(idx),
                    hops
                );
                self.registry.set_hop(idx, hops);
            }
            if hops > config.hop_limit {
                violations.push(Violation::HopLimit {
                    node: id,
                    hops,
                    limit: config.hop_limit,
                });
            }
            hop_count.insert(id, hops);
        }

        for &root in &roots {
            if let Some(cluster) = self.registry.cluster(root) {
                if cluster.weight > config.weight_capacity {
                    violations.push(Violation::Overweight {
                        subtree_root: self.registry.id(root),
                        weight: cluster.weight,
                        capacity: config.weight_capacity,
                    });
                }
            }
        }

        let total_cost = self.edges.iter().map(|e| e.cost).sum();

        AccessTree {
            hub: hub_id,
            total_cost,
            edges: self.edges,
            hop_count,
            parent,
            violations,
        }
    }
}

/// Build the access tree for one hub group
pub fn build_access_tree(group: &GroupRecord, config: &Config) -> Result<AccessTree, PlanError> {
    if group.terminals.is_empty() {
        config.validate()?;
        log::info!("Hub {} has no terminals; nothing to connect", group.hub.id);
        return Ok(AccessTree::empty(group.hub.id));
    }

    let mut engine = MergeEngine::new(group, config)?;
    engine.run()?;
    let merges = engine.edges().len();
    let tree = engine.finalize();

    log::info!(
        "Hub {}: {} terminals, {} merges, {} hub links, total cost {:.2}, max hop {}",
        tree.hub,
        group.terminals.len(),
        merges,
        tree.hub_degree(),
        tree.total_cost,
        tree.max_hop()
    );
    for violation in &tree.violations {
        log::warn!("Hub {}: bound violation {:?}", tree.hub, violation);
    }

    Ok(tree)
}

/// Build access trees for independent hub groups in parallel, preserving order
pub fn plan_groups(groups: &[GroupRecord], config: &Config) -> Result<Vec<AccessTree>, PlanError> {
    log::info!("Planning {} hub groups", groups.len());

    groups
        .par_iter()
        .map(|group| build_access_tree(group, config))
        .collect()
}

/// Direct hub-attachment cost of a group, the baseline merges improve on
pub fn star_cost(group: &GroupRecord) -> f64 {
    group
        .terminals
        .iter()
        .map(|t| euclidean_distance(t, &group.hub))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(terminals: &[(u32, f64, f64, f64)]) -> GroupRecord {
        GroupRecord::new(
            Site::new(0, 0.0, 0.0, 1.0),
            terminals
                .iter()
                .map(|&(id, x, y, w)| Site::new(id, x, y, w))
                .collect(),
        )
    }

    #[test]
    fn far_terminal_routes_through_near_one() {
        let g = group(&[(1, 1.0, 0.0, 1.0), (2, 2.0, 0.0, 1.0)]);
        let tree = build_access_tree(&g, &Config::new(10.0, 10)).unwrap();

        assert_eq!(
            tree.edges,
            vec![TreeEdge::new(2, 1, 1.0), TreeEdge::new(1, 0, 1.0)]
        );
        assert_eq!(tree.total_cost, 2.0);
        assert_eq!(tree.hop_count[&2], 2);
        assert_eq!(tree.parent[&2], 1);
        assert!(tree.is_feasible());
    }

    #[test]
    fn step_reports_commit_then_halt() {
        let g = group(&[(1, 1.0, 0.0, 1.0), (2, 2.0, 0.0, 1.0)]);
        let mut engine = MergeEngine::new(&g, &Config::new(10.0, 10)).unwrap();

        assert_eq!(
            engine.step().unwrap(),
            Step::Committed(TreeEdge::new(2, 1, 1.0))
        );
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.step().unwrap(), Step::Halted);
        assert_eq!(engine.state(), EngineState::Halted);
        assert_eq!(engine.registry().active_count(), 1);
    }

    #[test]
    fn stale_target_is_invalidated() {
        // 3 and 4 both prefer 2; once 3 joins 2 the weight bound blocks 4
        let g = group(&[
            (1, 1.0, 0.0, 1.0),
            (2, 10.0, 0.0, 1.0),
            (3, 11.0, 0.5, 1.0),
            (4, 11.0, -1.0, 1.0),
        ]);
        let mut engine = MergeEngine::new(&g, &Config::new(2.0, 5)).unwrap();

        assert_eq!(
            engine.step().unwrap(),
            Step::Committed(TreeEdge::new(3, 2, 1.0f64.hypot(0.5)))
        );
        assert_eq!(engine.step().unwrap(), Step::Invalidated { source: 4 });
        engine.run().unwrap();

        let tree = engine.finalize();
        assert_eq!(tree.edges.len(), 4);
        assert_eq!(tree.parent[&4], 0);
        assert!(tree.is_feasible());
    }

    #[test]
    fn absorbed_target_still_accepts_cached_merge() {
        // 3 caches 2, then 2 joins 1 before 3's turn comes up
        let g = group(&[(1, 10.0, 0.0, 1.0), (2, 11.0, 0.0, 1.0), (3, 11.0, 5.0, 1.0)]);
        let mut engine = MergeEngine::new(&g, &Config::new(10.0, 3)).unwrap();

        assert_eq!(
            engine.step().unwrap(),
            Step::Committed(TreeEdge::new(2, 1, 1.0))
        );
        assert_eq!(
            engine.step().unwrap(),
            Step::Committed(TreeEdge::new(3, 2, 5.0))
        );
        assert_eq!(engine.step().unwrap(), Step::Halted);
        assert_eq!(engine.registry().hop(2), 3);

        let tree = engine.finalize();
        assert_eq!(
            tree.edges,
            vec![
                TreeEdge::new(2, 1, 1.0),
                TreeEdge::new(3, 2, 5.0),
                TreeEdge::new(1, 0, 10.0),
            ]
        );
        assert_eq!(tree.total_cost, 16.0);
        assert_eq!(tree.hop_count[&3], 3);
        assert_eq!(tree.parent[&3], 2);
        assert!(tree.is_feasible());
    }

    #[test]
    fn absorbed_target_rechecks_hop_limit() {
        let g = group(&[(1, 10.0, 0.0, 1.0), (2, 11.0, 0.0, 1.0), (3, 11.0, 5.0, 1.0)]);
        let mut engine = MergeEngine::new(&g, &Config::new(10.0, 2)).unwrap();

        assert_eq!(
            engine.step().unwrap(),
            Step::Committed(TreeEdge::new(2, 1, 1.0))
        );
        assert_eq!(engine.step().unwrap(), Step::Invalidated { source: 3 });
        engine.run().unwrap();

        let tree = engine.finalize();
        assert_eq!(tree.parent[&3], 0);
        assert_eq!(tree.max_hop(), 2);
    }

    #[test]
    fn heavy_terminal_is_flagged_not_rejected() {
        let g = group(&[(1, 1.0, 0.0, 20.0), (2, 2.0, 0.0, 1.0)]);
        let tree = build_access_tree(&g, &Config::new(10.0, 4)).unwrap();

        assert_eq!(tree.hub_degree(), 2);
        assert_eq!(
            tree.violations,
            vec![Violation::Overweight {
                subtree_root: 1,
                weight: 20.0,
                capacity: 10.0,
            }]
        );
    }

    #[test]
    fn empty_group_is_degenerate() {
        let g = group(&[]);
        let tree = build_access_tree(&g, &Config::default()).unwrap();
        assert!(tree.edges.is_empty());
        assert_eq!(tree.total_cost, 0.0);
        assert_eq!(tree.hop_count.len(), 1);
    }

    #[test]
    fn rejects_malformed_groups() {
        let dup = group(&[(1, 1.0, 0.0, 1.0), (1, 2.0, 0.0, 1.0)]);
        assert!(matches!(
            build_access_tree(&dup, &Config::default()),
            Err(PlanError::DuplicateId(1))
        ));

        let clash = group(&[(0, 1.0, 0.0, 1.0)]);
        assert!(matches!(
            build_access_tree(&clash, &Config::default()),
            Err(PlanError::HubCollision(0))
        ));

        let ok = group(&[(1, 1.0, 0.0, 1.0)]);
        assert!(build_access_tree(&ok, &Config::new(10.0, 0)).is_err());

        let mut lost_hub = ok.clone();
        lost_hub.hub.x = f64::NAN;
        assert!(matches!(
            build_access_tree(&lost_hub, &Config::default()),
            Err(PlanError::InvalidCoordinate { id: 0, .. })
        ));
    }

    #[test]
    fn hub_weight_is_not_validated() {
        let mut g = group(&[(1, 1.0, 0.0, 1.0), (2, 2.0, 0.0, 1.0)]);
        g.hub.weight = 0.0;
        let tree = build_access_tree(&g, &Config::new(10.0, 10)).unwrap();
        assert_eq!(tree.total_cost, 2.0);
    }

    #[test]
    fn never_beats_star_cost_from_above() {
        let g = group(&[
            (1, 3.0, 4.0, 1.0),
            (2, 4.0, 4.0, 1.0),
            (3, 5.0, 4.0, 1.0),
            (4, -3.0, 1.0, 2.0),
            (5, -4.0, 1.5, 2.0),
        ]);
        let tree = build_access_tree(&g, &Config::new(6.0, 3)).unwrap();
        assert!(tree.total_cost <= star_cost(&g) + 1e-9);
    }
}
