//! Link cost between two sites

use crate::data::Site;

/// Euclidean distance between two sites, used as the link cost
pub fn euclidean_distance(a: &Site, b: &Site) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
