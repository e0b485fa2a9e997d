//! Site and group records exchanged between pipeline stages

pub mod generation;
pub mod groups;

use crate::error::PlanError;
use serde::{Deserialize, Serialize};

/// A point in the plane carrying a traffic demand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Identifier, unique within a run
    pub id: u32,

    /// Plane coordinates
    pub x: f64,
    pub y: f64,

    /// Traffic/demand carried by this site
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Site {
    pub fn new(id: u32, x: f64, y: f64, weight: f64) -> Self {
        Self { id, x, y, weight }
    }

    /// Reject non-finite coordinates; the weight is left unchecked
    pub fn validate_position(&self) -> Result<(), PlanError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(PlanError::InvalidCoordinate {
                id: self.id,
                x: self.x,
                y: self.y,
            });
        }
        Ok(())
    }

    /// Check that coordinates are finite and the weight is a positive number
    pub fn validate(&self) -> Result<(), PlanError> {
        self.validate_position()?;
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(PlanError::InvalidWeight {
                id: self.id,
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// One hub together with the terminals assigned to it
///
/// The legacy `backbone`/`access_nodes` keys are accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(alias = "backbone")]
    pub hub: Site,

    #[serde(alias = "access_nodes", default)]
    pub terminals: Vec<Site>,
}

impl GroupRecord {
    pub fn new(hub: Site, terminals: Vec<Site>) -> Self {
        Self { hub, terminals }
    }

    /// Total demand of the group's terminals
    pub fn terminal_weight(&self) -> f64 {
        self.terminals.iter().map(|t| t.weight).sum()
    }

    /// Look up a site (hub or terminal) by id
    pub fn site(&self, id: u32) -> Option<&Site> {
        if self.hub.id == id {
            return Some(&self.hub);
        }
        self.terminals.iter().find(|t| t.id == id)
    }
}
