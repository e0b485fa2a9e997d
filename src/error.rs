//! Error types for the access tree planner

use thiserror::Error;

/// Errors raised while validating planner input or persisting results.
///
/// Constraint infeasibility is never an error: a terminal that cannot be
/// merged falls back to a direct hub attachment and is reported through
/// [`crate::graph::Violation`] instead.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two terminals in one group share an id.
    #[error("duplicate terminal id {0} in group")]
    DuplicateId(u32),

    /// A terminal reuses the hub's id.
    #[error("terminal id {0} collides with the hub id")]
    HubCollision(u32),

    /// A site has a NaN or infinite coordinate.
    #[error("site {id} has a non-finite coordinate ({x}, {y})")]
    InvalidCoordinate { id: u32, x: f64, y: f64 },

    /// A site has a non-finite or non-positive weight.
    #[error("site {id} has invalid weight {weight}")]
    InvalidWeight { id: u32, weight: f64 },

    /// `union` was asked to merge a cluster into itself.
    #[error("cannot merge cluster rooted at {0} into itself")]
    SelfMerge(u32),

    /// `union` named a site that is no longer an active cluster root.
    #[error("site {0} is not the root of an active cluster")]
    DefunctCluster(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
