//! Results persistence module

use crate::cluster::metrics::{subtree_loads, summarize};
use crate::config::Config;
use crate::data::GroupRecord;
use crate::graph::AccessTree;
use anyhow::{ensure, Result};
use itertools::Itertools;
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Save planning results to the specified directory
pub fn save_results(
    groups: &[GroupRecord],
    trees: &[AccessTree],
    config: &Config,
    output_dir: &str,
) -> Result<()> {
    ensure!(
        groups.len() == trees.len(),
        "got {} groups but {} trees",
        groups.len(),
        trees.len()
    );
    log::info!("Saving {} access trees to {}", trees.len(), output_dir);

    fs::create_dir_all(output_dir)?;

    save_summary(groups, trees, config, output_dir)?;
    save_groups(groups, trees, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save summary information
fn save_summary(
    groups: &[GroupRecord],
    trees: &[AccessTree],
    config: &Config,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving summary information");

    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;

    let summaries = groups
        .iter()
        .zip(trees)
        .map(|(group, tree)| summarize(tree, group))
        .collect::<Vec<_>>();

    let summary = json!({
        "parameters": {
            "weight_capacity": config.weight_capacity,
            "hop_limit": config.hop_limit,
        },
        "plan_stats": {
            "group_count": trees.len(),
            "terminal_count": groups.iter().map(|g| g.terminals.len()).sum::<usize>(),
            "total_cost": trees.iter().map(|t| t.total_cost).sum::<f64>(),
            "max_hop": trees.iter().map(AccessTree::max_hop).max().unwrap_or(0),
            "violation_count": trees.iter().map(|t| t.violations.len()).sum::<usize>(),
        },
        "groups": summaries,
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save one file per access tree plus a combined listing
fn save_groups(groups: &[GroupRecord], trees: &[AccessTree], output_dir: &str) -> Result<()> {
    log::info!("Saving individual access trees");

    let groups_dir = Path::new(output_dir).join("groups");
    fs::create_dir_all(&groups_dir)?;

    for (n, (group, tree)) in groups.iter().zip(trees).enumerate() {
        let path = groups_dir.join(format!("group_{}.json", n + 1));
        let mut file = File::create(path)?;

        // Grouped by destination, as the tree reads from the hub outwards
        let edges = tree
            .edges
            .iter()
            .sorted_by_key(|e| (e.dst, e.src))
            .collect::<Vec<_>>();

        let group_json = json!({
            "hub": group.hub,
            "total_cost": tree.total_cost,
            "edges": edges,
            "hop_count": tree.hop_count,
            "parent": tree.parent,
            "subtrees": subtree_loads(tree, group),
            "violations": tree.violations,
        });

        file.write_all(to_string_pretty(&group_json)?.as_bytes())?;
    }

    let all_path = Path::new(output_dir).join("all_groups.json");
    let mut all_file = File::create(all_path)?;
    all_file.write_all(to_string_pretty(trees)?.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::build_access_tree;
    use crate::data::Site;

    #[test]
    fn writes_summary_and_group_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let config = Config::new(10.0, 4);
        let groups = vec![
            GroupRecord::new(
                Site::new(0, 0.0, 0.0, 30.0),
                vec![Site::new(1, 1.0, 0.0, 1.0), Site::new(2, 2.0, 0.0, 1.0)],
            ),
            GroupRecord::new(Site::new(5, 9.0, 9.0, 30.0), vec![]),
        ];
        let trees: Vec<AccessTree> = groups
            .iter()
            .map(|g| build_access_tree(g, &config).unwrap())
            .collect();

        save_results(&groups, &trees, &config, out).unwrap();

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["plan_stats"]["group_count"], 2);
        assert_eq!(summary["plan_stats"]["total_cost"], 2.0);
        assert_eq!(summary["parameters"]["hop_limit"], 4);

        let first: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("groups").join("group_1.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(first["edges"][0]["dst"], 0);
        assert_eq!(first["hop_count"]["2"], 2);

        let all: Vec<AccessTree> = serde_json::from_str(
            &fs::read_to_string(dir.path().join("all_groups.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(all, trees);
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let groups = vec![GroupRecord::new(Site::new(0, 0.0, 0.0, 1.0), vec![])];
        let err = save_results(&groups, &[], &Config::default(), dir.path().to_str().unwrap());
        assert!(err.is_err());
    }
}
