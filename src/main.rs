use access_tree_planner::backbone::{self, MentorConfig};
use access_tree_planner::data::{generation, groups};
use access_tree_planner::graph::algorithms::is_spanning_tree;
use access_tree_planner::{plan_groups, storage, viz, Config};
use anyhow::Result;
use clap::Parser;
use std::path::Path;

#[derive(Parser, Debug)]
#[clap(
    name = "access-tree-planner",
    about = "Capacity- and hop-constrained access tree planning (Esau-Williams)"
)]
struct Cli {
    /// Path to a JSON file of hub groups
    #[clap(long, required_unless_present = "generate", conflicts_with = "generate")]
    input: Option<String>,

    /// Generate this many random sites and select backbones instead of reading groups
    #[clap(long)]
    generate: Option<u32>,

    /// Largest coordinate of generated sites
    #[clap(long, default_value = "1000")]
    max_coord: u32,

    /// Seed for site generation
    #[clap(long, default_value = "1")]
    seed: u64,

    /// Output directory for results
    #[clap(long, default_value = "plan_results")]
    output_dir: String,

    /// Maximum total weight of a hub-attached sub-tree
    #[clap(long, default_value = "15")]
    weight_capacity: f64,

    /// Maximum hops from the hub to any terminal
    #[clap(long, default_value = "4")]
    hop_limit: u32,

    /// Normalized weight above which a generated site is a backbone
    #[clap(long, default_value = "2")]
    weight_threshold: f64,

    /// Access radius as a fraction of the largest site distance
    #[clap(long, default_value = "0.3")]
    radius_ratio: f64,

    /// Link capacity used to normalize site weights during backbone selection
    #[clap(long, default_value = "14")]
    link_capacity: f64,

    /// Skip visualizations
    #[clap(long)]
    skip_viz: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = Config::new(args.weight_capacity, args.hop_limit);
    config.validate()?;

    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Obtain hub groups
    let groups = match (&args.input, args.generate) {
        (Some(path), _) => groups::load_groups(path)?,
        (None, Some(count)) => {
            let sites = generation::generate_sites(count, args.max_coord, args.seed);
            let mentor = MentorConfig {
                weight_threshold: args.weight_threshold,
                radius_ratio: args.radius_ratio,
                capacity: args.link_capacity,
            };
            let selected = backbone::select_backbones(&sites, &mentor);
            if let Some(center) = backbone::central_backbone(&selected) {
                log::info!("Central backbone: {}", center);
            }
            groups::save_groups(Path::new(&args.output_dir).join("groups.json"), &selected)?;
            selected
        }
        (None, None) => anyhow::bail!("either --input or --generate is required"),
    };

    log::info!(
        "Planning with weight capacity {} and hop limit {}",
        config.weight_capacity,
        config.hop_limit
    );

    // 2. Build one access tree per hub
    let trees = plan_groups(&groups, &config)?;

    for (group, tree) in groups.iter().zip(&trees) {
        if !is_spanning_tree(&tree.edges, &group.hub, &group.terminals) {
            log::warn!("Hub {}: edge set is not a spanning tree", tree.hub);
        }
    }

    let total_cost: f64 = trees.iter().map(|t| t.total_cost).sum();
    let violations: usize = trees.iter().map(|t| t.violations.len()).sum();
    log::info!(
        "Planned {} groups, total cost {:.2}, {} bound violations",
        trees.len(),
        total_cost,
        violations
    );

    // 3. Save results
    storage::save_results(&groups, &trees, &config, &args.output_dir)?;

    // 4. Generate visualizations if requested
    if !args.skip_viz {
        viz::generate_visualizations(&groups, &trees, &config, &args.output_dir)?;
    }

    log::info!("Planning complete. Results saved to {}", args.output_dir);

    Ok(())
}
