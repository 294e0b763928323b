//! Density-based clustering of low-dimensional point sets with the
//! common-nearest-neighbor (CNN) and volume-scaled CNN predicates.
//!
//! The crate provides the neighborhood machinery, the seed-and-expand
//! engine, hierarchical refinement under a shrinking radius, a parameter
//! scan driver, the projection of held-out frames onto finished clusters
//! and the reconstruction of discretized trajectories.

// geometry and neighborhood machinery shared by every component
pub mod geometry;
pub mod neighbors;

// the connectivity predicates and the clustering engine itself
pub mod similarity;
pub mod engine;

// drivers layered on top of the engine
pub mod hierarchy;
pub mod scan;
pub mod mapping;
pub mod discretize;

pub mod errors;

// re-export the symbols most callers need
pub use neighbors::{NeighborMap, build_neighbor_map, build_dual_neighbor_maps};
pub use similarity::Similarity;
pub use hierarchy::{ClusteringStep, refine_hierarchically};
pub use errors::{ClusteringError, validate_input};

/// Clusters a point set in one call: builds the neighborhood map for
/// `(cut, sim)` and runs the seed-and-expand engine on it.
///
/// With `mutual` off the dual-range build also records second-shell
/// neighbors, extending the reach of every cluster.
///
/// # Examples
/// ```rust
/// use mdcluster_clustering::{clustering, Similarity};
/// let data: Vec<Vec<f32>> = (0..6).map(|i| vec![i as f32, 0.0]).collect();
/// let clusters = clustering(Similarity::CommonNeighbors, &data, 2.5, 2, 0, true);
/// assert_eq!(clusters.len(), 1);
/// ```
pub fn clustering(similarity: Similarity, data: &[Vec<f32>], cut: f32, sim: usize,
                  nkeep: usize, mutual: bool) -> Vec<Vec<usize>> {
    let (neighbors_ij, second_neighbors_ij) = if mutual {
        (build_neighbor_map(data, cut, sim), NeighborMap::new())
    } else {
        build_dual_neighbor_maps(data, cut, sim, false)
    };

    engine::cluster(similarity, data, &neighbors_ij, &second_neighbors_ij,
                    cut, sim, nkeep, mutual)
}
