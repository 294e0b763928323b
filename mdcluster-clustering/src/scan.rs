//! Parameter scan: sweep a `(cut, sim)` schedule until a coverage target
//! is met.

use log::info;

use crate::engine;
use crate::hierarchy::ClusteringStep;
use crate::neighbors::{build_dual_neighbor_maps, build_neighbor_map, NeighborMap};
use crate::similarity::Similarity;

/// Builds the scan schedule `(cut - i·delta_cut, sim + i·delta_sim)` for
/// `i` in `0..=nsteps`. A negative `delta_cut` therefore grows the radius.
pub fn scan_schedule(nsteps: usize, cut: f32, delta_cut: f32, sim: usize,
                     delta_sim: usize) -> Vec<ClusteringStep> {
    (0..=nsteps)
        .map(|i| ClusteringStep::new(i as u32, cut - delta_cut * i as f32, sim + delta_sim * i))
        .collect()
}

/// Clusters the data once per schedule entry, stopping at the first entry
/// whose clusters cover at least `round(relmax · N)` points.
///
/// Schedule entries producing fewer than two neighbor lists are skipped.
/// The winning clusters are returned with a uniform leaf record for that
/// entry; an exhausted schedule yields empty collections.
pub fn scan_clustering(similarity: Similarity, data: &[Vec<f32>], plan: &[ClusteringStep],
                       nkeep: usize, relmax: f32,
                       mutual: bool) -> (Vec<Vec<usize>>, Vec<ClusteringStep>) {
    let maxsz = (relmax * data.len() as f32).round() as usize;

    for step in plan {
        let (neighbors_ij, second_neighbors_ij) = if mutual {
            (build_neighbor_map(data, step.cut, step.sim), NeighborMap::new())
        } else {
            build_dual_neighbor_maps(data, step.cut, step.sim, false)
        };
        if neighbors_ij.len() < 2 { continue; }

        let scan_clusters = engine::cluster(similarity, data, &neighbors_ij,
                                            &second_neighbors_ij, step.cut, step.sim,
                                            nkeep, mutual);

        let amount_clustered: usize = scan_clusters.iter().map(|cluster_i| cluster_i.len()).sum();
        info!("scan step {} cut {:.4} sim {}: {} clusters hold {} of {} frames",
              step.step, step.cut, step.sim, scan_clusters.len(), amount_clustered, data.len());

        if amount_clustered >= maxsz {
            let leaves = vec![*step; scan_clusters.len()];
            return (scan_clusters, leaves);
        }
    }

    (Vec::new(), Vec::new())
}
