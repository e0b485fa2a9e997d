//! Capacity- and hop-constrained access tree planning (Esau-Williams)

pub mod backbone;
pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod storage;
pub mod viz;

pub use cluster::{build_access_tree, plan_groups};
pub use config::Config;
pub use data::{GroupRecord, Site};
pub use error::PlanError;
pub use graph::{AccessTree, TreeEdge, Violation};
