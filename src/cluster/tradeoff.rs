//! Savings ("trade-off") evaluation between clusters

use crate::cluster::ClusterRegistry;
use crate::config::Config;
use crate::data::Site;
use crate::graph::euclidean_distance;

/// Best merge found for one source cluster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tradeoff {
    /// Savings of linking `source` to `target` instead of to the hub
    pub value: f64,

    /// Terminal index the savings are anchored on
    pub source: usize,

    /// Terminal index to link `source` to; a cluster root when cached
    pub target: usize,
}

/// Effect of a merge that respects both bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergePlan {
    /// Hop shift applied to every absorbed member
    pub hop_increment: i64,

    /// Weight of the merged cluster
    pub weight: f64,

    /// Greatest hop count in the merged cluster
    pub max_hop: u32,
}

/// Check whether the cluster rooted at `root_i` may hang off terminal `target`
///
/// `root_j` is the root of the active cluster holding `target`. The hop shift
/// comes from `target`'s own hop count, the bounds from the two clusters.
/// Returns `None` when the merged cluster would exceed the weight capacity or
/// the hop limit.
pub fn feasible_merge(
    registry: &ClusterRegistry,
    root_i: usize,
    target: usize,
    root_j: usize,
    config: &Config,
) -> Option<MergePlan> {
    let source = registry.cluster(root_i)?;
    let dest = registry.cluster(root_j)?;

    let hop_increment = i64::from(registry.hop(target)) + 1 - i64::from(registry.hop(root_i));
    let shifted = i64::from(source.max_hop) + hop_increment;
    let max_hop = i64::from(dest.max_hop).max(shifted);
    if max_hop > i64::from(config.hop_limit) {
        return None;
    }

    let weight = source.weight + dest.weight;
    if weight > config.weight_capacity {
        return None;
    }

    Some(MergePlan {
        hop_increment,
        weight,
        max_hop: u32::try_from(max_hop).ok()?,
    })
}

/// Scans active clusters for the best feasible merge partner
pub struct TradeoffEvaluator {
    /// Terminals sorted by id, addressed by registry index
    terminals: Vec<Site>,

    /// Direct link cost of each terminal to the hub
    hub_cost: Vec<f64>,

    config: Config,
}

impl TradeoffEvaluator {
    pub fn new(hub: &Site, terminals: Vec<Site>, config: Config) -> Self {
        let hub_cost = terminals
            .iter()
            .map(|t| euclidean_distance(t, hub))
            .collect();
        Self {
            terminals,
            hub_cost,
            config,
        }
    }

    /// Link cost between two terminal indices
    pub fn cost(&self, a: usize, b: usize) -> f64 {
        euclidean_distance(&self.terminals[a], &self.terminals[b])
    }

    pub fn hub_cost(&self, idx: usize) -> f64 {
        self.hub_cost[idx]
    }

    pub fn terminal(&self, idx: usize) -> &Site {
        &self.terminals[idx]
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Best feasible merge target for the cluster containing `anchor`
    ///
    /// Savings are measured from `anchor`; bounds are checked on its cluster
    /// root. The largest savings win, ties going to the lowest target id.
    pub fn compute_tradeoff(&self, registry: &mut ClusterRegistry, anchor: usize) -> Option<Tradeoff> {
        let root_i = registry.find(anchor);
        let registry = &*registry;
        if !registry.is_active(root_i) {
            return None;
        }

        let dist_hub = self.hub_cost[anchor];
        let mut best: Option<Tradeoff> = None;

        for target in registry.active_roots() {
            if target == root_i {
                continue;
            }

            let value = dist_hub - self.cost(anchor, target);
            if value <= 0.0 {
                continue;
            }

            if best.is_some_and(|b| value <= b.value) {
                continue;
            }

            if feasible_merge(registry, root_i, target, target, &self.config).is_some() {
                best = Some(Tradeoff {
                    value,
                    source: anchor,
                    target,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(terminals: Vec<Site>, config: Config) -> (TradeoffEvaluator, ClusterRegistry) {
        let hub = Site::new(0, 0.0, 0.0, 1.0);
        let registry = ClusterRegistry::new(&terminals);
        (TradeoffEvaluator::new(&hub, terminals, config), registry)
    }

    #[test]
    fn picks_largest_savings() {
        let (eval, mut reg) = setup(
            vec![
                Site::new(1, 1.0, 0.0, 1.0),
                Site::new(2, 5.0, 0.0, 1.0),
                Site::new(3, 6.0, 0.0, 1.0),
            ],
            Config::new(10.0, 5),
        );

        let best = eval.compute_tradeoff(&mut reg, 2).unwrap();
        assert_eq!(best.source, 2);
        assert_eq!(best.target, 1);
        assert_eq!(best.value, 5.0);

        // Nearest terminal to the hub never saves anything
        assert!(eval.compute_tradeoff(&mut reg, 0).is_none());
    }

    #[test]
    fn ties_go_to_lowest_target() {
        let (eval, mut reg) = setup(
            vec![
                Site::new(1, 4.0, 1.0, 1.0),
                Site::new(2, 4.0, -1.0, 1.0),
                Site::new(3, 5.0, 0.0, 1.0),
            ],
            Config::new(10.0, 5),
        );

        let best = eval.compute_tradeoff(&mut reg, 2).unwrap();
        assert_eq!(best.target, 0);
    }

    #[test]
    fn respects_weight_capacity() {
        let (eval, mut reg) = setup(
            vec![Site::new(1, 1.0, 0.0, 3.0), Site::new(2, 2.0, 0.0, 3.0)],
            Config::new(5.0, 5),
        );
        assert!(eval.compute_tradeoff(&mut reg, 1).is_none());
    }

    #[test]
    fn respects_hop_limit() {
        let (eval, mut reg) = setup(
            vec![Site::new(1, 1.0, 0.0, 1.0), Site::new(2, 2.0, 0.0, 1.0)],
            Config::new(5.0, 1),
        );
        assert!(eval.compute_tradeoff(&mut reg, 1).is_none());
    }

    #[test]
    fn merge_plan_tracks_depth_and_weight() {
        let (eval, mut reg) = setup(
            vec![
                Site::new(1, 1.0, 0.0, 1.0),
                Site::new(2, 2.0, 0.0, 2.0),
                Site::new(3, 3.0, 0.0, 4.0),
            ],
            Config::new(10.0, 3),
        );
        reg.union(2, 1, 1).unwrap();

        let plan = feasible_merge(&reg, 1, 0, 0, eval.config()).unwrap();
        assert_eq!(plan.hop_increment, 1);
        assert_eq!(plan.weight, 7.0);
        assert_eq!(plan.max_hop, 3);

        assert!(feasible_merge(&reg, 1, 0, 0, &Config::new(10.0, 2)).is_none());
        assert!(feasible_merge(&reg, 1, 0, 0, &Config::new(6.5, 3)).is_none());
    }

    #[test]
    fn absorbed_target_shifts_by_its_own_depth() {
        let (eval, mut reg) = setup(
            vec![
                Site::new(1, 1.0, 0.0, 1.0),
                Site::new(2, 2.0, 0.0, 2.0),
                Site::new(3, 3.0, 0.0, 4.0),
            ],
            Config::new(10.0, 3),
        );
        reg.union(1, 0, 1).unwrap();

        // Terminal 1 now sits two hops out inside the cluster rooted at 0
        let plan = feasible_merge(&reg, 2, 1, 0, eval.config()).unwrap();
        assert_eq!(plan.hop_increment, 2);
        assert_eq!(plan.weight, 7.0);
        assert_eq!(plan.max_hop, 3);

        assert!(feasible_merge(&reg, 2, 1, 0, &Config::new(10.0, 2)).is_none());
    }
}
