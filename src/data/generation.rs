//! Synthetic site generation for planning experiments

use crate::data::Site;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sites with a demand above the unit default
const HEAVY_SITES: [(u32, f64); 16] = [
    (3, 30.0),
    (12, 30.0),
    (29, 30.0),
    (69, 30.0),
    (17, 6.0),
    (22, 6.0),
    (49, 6.0),
    (6, 4.0),
    (63, 4.0),
    (77, 4.0),
    (37, 5.0),
    (42, 5.0),
    (47, 5.0),
    (8, 3.0),
    (45, 3.0),
    (57, 3.0),
];

/// Demand of the site with the given id
pub fn site_weight(id: u32) -> f64 {
    HEAVY_SITES
        .iter()
        .find(|(heavy, _)| *heavy == id)
        .map_or(1.0, |&(_, w)| w)
}

/// Generate `count` sites with ids `1..=count` on an integer grid `[0, max_coord]`
pub fn generate_sites(count: u32, max_coord: u32, seed: u64) -> Vec<Site> {
    log::info!("Generating {} sites (max coordinate {}, seed {})", count, max_coord, seed);

    let mut rng = StdRng::seed_from_u64(seed);
    (1..=count)
        .map(|id| {
            let x = rng.gen_range(0..=max_coord);
            let y = rng.gen_range(0..=max_coord);
            Site::new(id, f64::from(x), f64::from(y), site_weight(id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_seeded() {
        let a = generate_sites(50, 1000, 7);
        let b = generate_sites(50, 1000, 7);
        assert_eq!(a, b);
        assert_ne!(a, generate_sites(50, 1000, 8));
    }

    #[test]
    fn heavy_sites_get_their_demand() {
        let sites = generate_sites(100, 1000, 1);
        assert_eq!(sites.len(), 100);
        assert_eq!(sites[2].weight, 30.0);
        assert_eq!(sites[16].weight, 6.0);
        assert_eq!(sites[0].weight, 1.0);
        assert!(sites.iter().all(|s| s.x <= 1000.0 && s.y >= 0.0));
    }
}
