//! Visualization export module
//!
//! Writes plain data files (GraphML, CSV, HTML) that external plotting tools
//! can render; nothing here draws on its own.

use crate::config::Config;
use crate::data::GroupRecord;
use crate::graph::{AccessTree, Violation};
use anyhow::Result;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Generate visualization inputs from planning results
pub fn generate_visualizations(
    groups: &[GroupRecord],
    trees: &[AccessTree],
    config: &Config,
    output_dir: &str,
) -> Result<()> {
    log::info!("Generating visualizations for {} access trees", trees.len());

    let viz_dir = Path::new(output_dir).join("visualizations");
    fs::create_dir_all(&viz_dir)?;

    generate_network_data(groups, trees, &viz_dir)?;
    generate_html_index(groups, trees, config, &viz_dir)?;

    log::info!("Visualizations generated successfully");

    Ok(())
}

/// Ids of terminals named in any violation
fn violating_nodes(tree: &AccessTree) -> HashSet<u32> {
    tree.violations
        .iter()
        .map(|v| match *v {
            Violation::HopLimit { node, .. } => node,
            Violation::Overweight { subtree_root, .. } => subtree_root,
            Violation::Unreachable { node } => node,
        })
        .collect()
}

/// Write one GraphML file per tree and a CSV of every placed site
fn generate_network_data(
    groups: &[GroupRecord],
    trees: &[AccessTree],
    viz_dir: &Path,
) -> Result<()> {
    log::info!("Generating network data files");

    let data_dir = viz_dir.join("data");
    fs::create_dir_all(&data_dir)?;

    let nodes_file_path = data_dir.join("nodes.csv");
    let mut nodes_file = File::create(nodes_file_path)?;
    writeln!(nodes_file, "group,id,x,y,weight,hop,parent,is_hub,violates")?;

    for (n, (group, tree)) in groups.iter().zip(trees).enumerate() {
        let group_no = n + 1;
        let flagged = violating_nodes(tree);

        let file_path = data_dir.join(format!("group_{}_tree.graphml", group_no));
        let mut file = File::create(file_path)?;

        writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(file, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
        for (key, name, kind) in [
            ("x", "x", "node"),
            ("y", "y", "node"),
            ("w", "weight", "node"),
            ("h", "hop", "node"),
            ("c", "cost", "edge"),
        ] {
            writeln!(
                file,
                "  <key id=\"{}\" for=\"{}\" attr.name=\"{}\" attr.type=\"double\"/>",
                key, kind, name
            )?;
        }
        writeln!(file, "  <graph id=\"G{}\" edgedefault=\"directed\">", group_no)?;

        for site in std::iter::once(&group.hub).chain(&group.terminals) {
            let hop = tree.hop_count.get(&site.id);
            writeln!(file, "    <node id=\"n{}\">", site.id)?;
            writeln!(file, "      <data key=\"x\">{}</data>", site.x)?;
            writeln!(file, "      <data key=\"y\">{}</data>", site.y)?;
            writeln!(file, "      <data key=\"w\">{}</data>", site.weight)?;
            if let Some(hop) = hop {
                writeln!(file, "      <data key=\"h\">{}</data>", hop)?;
            }
            writeln!(file, "    </node>")?;

            writeln!(
                nodes_file,
                "{},{},{},{},{},{},{},{},{}",
                group_no,
                site.id,
                site.x,
                site.y,
                site.weight,
                hop.map_or_else(String::new, u32::to_string),
                tree.parent
                    .get(&site.id)
                    .map_or_else(String::new, u32::to_string),
                site.id == group.hub.id,
                flagged.contains(&site.id)
            )?;
        }

        for (edge_id, edge) in tree.edges.iter().enumerate() {
            writeln!(
                file,
                "    <edge id=\"e{}\" source=\"n{}\" target=\"n{}\">",
                edge_id, edge.src, edge.dst
            )?;
            writeln!(file, "      <data key=\"c\">{:.4}</data>", edge.cost)?;
            writeln!(file, "    </edge>")?;
        }

        writeln!(file, "  </graph>")?;
        writeln!(file, "</graphml>")?;
    }

    Ok(())
}

/// Generate an HTML overview page
fn generate_html_index(
    groups: &[GroupRecord],
    trees: &[AccessTree],
    config: &Config,
    viz_dir: &Path,
) -> Result<()> {
    log::info!("Generating HTML overview");

    let index_path = viz_dir.join("index.html");
    let mut index_file = File::create(index_path)?;

    writeln!(index_file, "<!DOCTYPE html>")?;
    writeln!(index_file, "<html lang=\"en\">")?;
    writeln!(index_file, "<head>")?;
    writeln!(index_file, "  <meta charset=\"UTF-8\">")?;
    writeln!(index_file, "  <title>Access Tree Plan</title>")?;
    writeln!(index_file, "  <style>")?;
    writeln!(index_file, "    body {{ font-family: Arial, sans-serif; margin: 20px; }}")?;
    writeln!(index_file, "    .group-list {{ display: flex; flex-wrap: wrap; }}")?;
    writeln!(index_file, "    .group-card {{ border: 1px solid #ddd; margin: 10px; padding: 15px; border-radius: 5px; width: 300px; }}")?;
    writeln!(index_file, "    .violation {{ color: #b00; }}")?;
    writeln!(index_file, "  </style>")?;
    writeln!(index_file, "</head>")?;
    writeln!(index_file, "<body>")?;
    writeln!(index_file, "  <h1>Access Tree Plan</h1>")?;
    writeln!(
        index_file,
        "  <p>Weight capacity {} / hop limit {}</p>",
        config.weight_capacity, config.hop_limit
    )?;
    writeln!(
        index_file,
        "  <p>Total cost: {:.2}</p>",
        trees.iter().map(|t| t.total_cost).sum::<f64>()
    )?;

    writeln!(index_file, "  <div class=\"group-list\">")?;
    for (n, (group, tree)) in groups.iter().zip(trees).enumerate() {
        writeln!(index_file, "    <div class=\"group-card\">")?;
        writeln!(index_file, "      <h3>Group {} (hub {})</h3>", n + 1, tree.hub)?;
        writeln!(index_file, "      <p>Terminals: {}</p>", group.terminals.len())?;
        writeln!(index_file, "      <p>Cost: {:.2}</p>", tree.total_cost)?;
        writeln!(index_file, "      <p>Max hop: {}</p>", tree.max_hop())?;
        if !tree.violations.is_empty() {
            writeln!(
                index_file,
                "      <p class=\"violation\">Violations: {}</p>",
                tree.violations.len()
            )?;
        }
        writeln!(index_file, "    </div>")?;
    }
    writeln!(index_file, "  </div>")?;
    writeln!(index_file, "</body>")?;
    writeln!(index_file, "</html>")?;

    Ok(())
}
