//! Geometry, tree representation and graph algorithms module

pub mod algorithms;
pub mod builder;
pub mod geometry;
pub mod tree;

pub use builder::{TreeGraph, TreeGraphBuilder};
pub use geometry::euclidean_distance;
pub use tree::{AccessTree, TreeEdge, Violation};
