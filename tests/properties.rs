use access_tree_planner::cluster::engine::star_cost;
use access_tree_planner::cluster::metrics::replay_peak_load;
use access_tree_planner::graph::algorithms::is_spanning_tree;
use access_tree_planner::{build_access_tree, Config, GroupRecord, Site, Violation};
use proptest::prelude::*;

fn group_strategy() -> impl Strategy<Value = GroupRecord> {
    prop::collection::vec((0u32..100, 0u32..100, 1u32..6), 0..24).prop_map(|raw| {
        let terminals = raw
            .into_iter()
            .enumerate()
            .map(|(i, (x, y, w))| Site::new(i as u32 + 1, f64::from(x), f64::from(y), f64::from(w)))
            .collect();
        GroupRecord::new(Site::new(0, 50.0, 50.0, 30.0), terminals)
    })
}

proptest! {
    #[test]
    fn output_is_a_spanning_tree(group in group_strategy(), w in 1u32..20, h in 1u32..6) {
        let tree = build_access_tree(&group, &Config::new(f64::from(w), h)).unwrap();

        prop_assert_eq!(tree.edges.len(), group.terminals.len());
        prop_assert!(is_spanning_tree(&tree.edges, &group.hub, &group.terminals));
        prop_assert_eq!(tree.hop_count.len(), group.terminals.len() + 1);
        prop_assert_eq!(tree.parent.len(), group.terminals.len());
    }

    #[test]
    fn bounds_hold_except_for_heavy_singletons(group in group_strategy(), w in 1u32..20, h in 1u32..6) {
        let config = Config::new(f64::from(w), h);
        let tree = build_access_tree(&group, &config).unwrap();

        prop_assert!(replay_peak_load(&tree, &group) <= config.weight_capacity);
        prop_assert!(tree.max_hop() <= h.max(1));

        for violation in &tree.violations {
            match violation {
                Violation::Overweight { subtree_root, .. } => {
                    let site = group.site(*subtree_root).unwrap();
                    prop_assert!(site.weight > config.weight_capacity);
                    prop_assert_eq!(tree.hop_count[subtree_root], 1);
                }
                other => prop_assert!(false, "unexpected violation {:?}", other),
            }
        }
    }

    #[test]
    fn planning_is_deterministic(group in group_strategy(), w in 1u32..20, h in 1u32..6) {
        let config = Config::new(f64::from(w), h);
        let first = build_access_tree(&group, &config).unwrap();
        let second = build_access_tree(&group, &config).unwrap();
        prop_assert_eq!(&first, &second);

        let mut reversed = group.clone();
        reversed.terminals.reverse();
        prop_assert_eq!(first, build_access_tree(&reversed, &config).unwrap());
    }

    #[test]
    fn never_costs_more_than_direct_attachment(group in group_strategy(), w in 1u32..20, h in 1u32..6) {
        let tree = build_access_tree(&group, &Config::new(f64::from(w), h)).unwrap();
        prop_assert!(tree.total_cost <= star_cost(&group) + 1e-6);
    }
}
