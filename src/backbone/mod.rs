//! MENTOR-style backbone selection
//!
//! Splits a full site set into hub-centred groups before access trees are
//! built. Heavy sites become backbones outright; the remaining sites are
//! claimed by the nearest backbone within an access radius, and any site left
//! over is covered by promoting the best-rewarded remaining site until none
//! are left unassigned.

use crate::data::{GroupRecord, Site};
use crate::graph::euclidean_distance;
use serde::{Deserialize, Serialize};

/// Parameters of the backbone selection pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MentorConfig {
    /// Normalized weight above which a site is a backbone outright
    pub weight_threshold: f64,

    /// Access radius as a fraction of the largest pairwise distance
    pub radius_ratio: f64,

    /// Link capacity used to normalize site weights
    pub capacity: f64,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            weight_threshold: 2.0,
            radius_ratio: 0.3,
            capacity: 14.0,
        }
    }
}

/// Largest distance between any two sites
pub fn max_pairwise_distance(sites: &[Site]) -> f64 {
    let mut max_dist: f64 = 0.0;
    for (i, a) in sites.iter().enumerate() {
        for b in &sites[i + 1..] {
            max_dist = max_dist.max(euclidean_distance(a, b));
        }
    }
    max_dist
}

/// Partition `sites` into one group per selected backbone
///
/// Groups are returned in backbone selection order: threshold backbones in
/// input order first, then award-promoted ones.
pub fn select_backbones(sites: &[Site], config: &MentorConfig) -> Vec<GroupRecord> {
    let radius = config.radius_ratio * max_pairwise_distance(sites);
    log::info!("Access radius {:.2} over {} sites", radius, sites.len());

    let (backbones, mut remaining): (Vec<Site>, Vec<Site>) = sites
        .iter()
        .copied()
        .partition(|s| s.weight / config.capacity > config.weight_threshold);
    log::info!("{} sites exceed the backbone weight threshold", backbones.len());

    let mut groups: Vec<GroupRecord> = backbones
        .into_iter()
        .map(|hub| GroupRecord::new(hub, Vec::new()))
        .collect();

    // Nearest threshold backbone within the radius claims each site
    remaining.retain(|site| {
        let nearest = groups
            .iter()
            .enumerate()
            .map(|(idx, g)| (idx, euclidean_distance(site, &g.hub)))
            .filter(|&(_, dist)| dist <= radius)
            .fold(None, |best: Option<(usize, f64)>, cand| match best {
                Some((_, d)) if d <= cand.1 => best,
                _ => Some(cand),
            });

        match nearest {
            Some((idx, _)) => {
                groups[idx].terminals.push(*site);
                false
            }
            None => true,
        }
    });

    while let Some(best) = best_rewarded(&remaining) {
        let hub = remaining.remove(best);
        let (terminals, rest): (Vec<Site>, Vec<Site>) = remaining
            .into_iter()
            .partition(|s| euclidean_distance(s, &hub) <= radius);
        remaining = rest;

        log::debug!(
            "Promoted site {} to backbone with {} access sites",
            hub.id,
            terminals.len()
        );
        groups.push(GroupRecord::new(hub, terminals));
    }

    log::info!("Selected {} backbones", groups.len());
    groups
}

/// Index of the site with the highest award, first one on ties
///
/// The award favours sites close to the weighted centroid of `remaining` and
/// sites carrying a large weight, each term normalized to `[0, 1]`.
fn best_rewarded(remaining: &[Site]) -> Option<usize> {
    if remaining.is_empty() {
        return None;
    }

    let total_weight: f64 = remaining.iter().map(|s| s.weight).sum();
    let (cx, cy) = if total_weight > 0.0 {
        (
            remaining.iter().map(|s| s.x * s.weight).sum::<f64>() / total_weight,
            remaining.iter().map(|s| s.y * s.weight).sum::<f64>() / total_weight,
        )
    } else {
        (0.0, 0.0)
    };

    let dc: Vec<f64> = remaining.iter().map(|s| (s.x - cx).hypot(s.y - cy)).collect();
    let max_dc = dc.iter().copied().fold(0.0, f64::max);
    let max_w = remaining.iter().map(|s| s.weight).fold(0.0, f64::max);

    let mut best = None;
    let mut best_award = f64::NEG_INFINITY;
    for (idx, site) in remaining.iter().enumerate() {
        let closeness = if max_dc > 0.0 { (max_dc - dc[idx]) / max_dc } else { 0.0 };
        let heaviness = if max_w > 0.0 { site.weight / max_w } else { 0.0 };
        let award = closeness + heaviness;
        if award > best_award {
            best_award = award;
            best = Some(idx);
        }
    }
    best
}

/// Backbone with the smallest weighted distance to all other backbones
pub fn central_backbone(groups: &[GroupRecord]) -> Option<u32> {
    let moment = |hub: &Site| -> f64 {
        groups
            .iter()
            .filter(|g| g.hub.id != hub.id)
            .map(|g| euclidean_distance(hub, &g.hub) * g.hub.weight)
            .sum()
    };

    groups
        .iter()
        .map(|g| (g.hub.id, moment(&g.hub)))
        .fold(None, |best: Option<(u32, f64)>, cand| match best {
            Some((_, m)) if m <= cand.1 => best,
            _ => Some(cand),
        })
        .map(|(id, _)| id)
}
