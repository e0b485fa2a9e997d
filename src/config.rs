//! Configuration management for the access tree planner

use crate::error::PlanError;
use serde::{Deserialize, Serialize};

/// Resource bounds applied while building one access tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum aggregate weight (W) of any hub-attached sub-tree
    pub weight_capacity: f64,

    /// Maximum hop count (H) from the hub to any terminal
    pub hop_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weight_capacity: 15.0,
            hop_limit: 4,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(weight_capacity: f64, hop_limit: u32) -> Self {
        Self {
            weight_capacity,
            hop_limit,
        }
    }

    /// Reject bounds the merge engine cannot work with
    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.weight_capacity.is_finite() || self.weight_capacity <= 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "weight capacity must be a positive number, got {}",
                self.weight_capacity
            )));
        }
        if self.hop_limit == 0 {
            return Err(PlanError::InvalidConfig(
                "hop limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
