//! Hierarchical refinement: re-cluster every cluster under a shrinking
//! neighborhood radius until nothing can split any further.

use log::info;

use crate::engine;
use crate::neighbors::{cluster_neighbor_map, NeighborMap};
use crate::similarity::Similarity;

/// One level of a clustering hierarchy: the iteration index together with
/// the radius and similarity threshold in effect at that level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringStep {
    /// Iteration index within the hierarchy
    pub step: u32,
    /// Neighborhood radius at this level
    pub cut: f32,
    /// Similarity threshold at this level
    pub sim: usize,
}

impl ClusteringStep {
    pub fn new(step: u32, cut: f32, sim: usize) -> ClusteringStep {
        ClusteringStep { step, cut, sim }
    }
}

/// Refines a base clustering under an exponentially shrinking radius.
///
/// Per level, every cluster larger than `nsplit` is re-clustered on its own
/// neighborhood (keys from the cluster, neighbors from the full point set)
/// at the current `(cut, sim)`. An empty engine result keeps the parent; a
/// single subcluster is replaced by the parent as well, so one level never
/// shrinks a cluster. Between levels the radius decays by
/// `exp(-delta_fe / ndims)`. The loop stops once no refined parent had a
/// neighborhood map larger than `2 * nkeep` entries.
///
/// `clusters` is rewritten in place, children substituted at their parent's
/// position. The returned leaf records run parallel to the final cluster
/// list: `leaves[i]` is the step at which cluster `i` last split.
///
/// # Arguments
/// * `similarity` - the connectivity predicate
/// * `clusters` - the base clustering, refined in place
/// * `data` - the full point set
/// * `init_step` - step record of the base clustering
/// * `delta_fe` - free-energy increment controlling the radius decay
/// * `ndims` - dimensionality of the data
/// * `nkeep` - minimum retained cluster size
/// * `nsplit` - minimum cluster size eligible for splitting
/// * `mutual` - forwarded to the engine
pub fn refine_hierarchically(similarity: Similarity, clusters: &mut Vec<Vec<usize>>,
                             data: &[Vec<f32>], init_step: ClusteringStep, delta_fe: f32,
                             ndims: usize, nkeep: usize, nsplit: usize,
                             mutual: bool) -> Vec<ClusteringStep> {
    let mut leaves: Vec<ClusteringStep> = vec![init_step; clusters.len()];
    let bfactor = (-delta_fe / ndims as f32).exp();
    let total_frames = data.len() as f32;

    info!("hierarchical refinement from cut {:.4}, radius decay factor {:.6}",
          init_step.cut, bfactor);

    let mut step = init_step;
    let mut enough_neighbor_lists = true;
    while enough_neighbor_lists {
        let mut map_sizes: Vec<usize> = vec![0; clusters.len()];
        let mut hierarchic_clusters: Vec<Vec<Vec<usize>>> = Vec::with_capacity(clusters.len());

        for (cluster_idx, cluster_i) in clusters.iter().enumerate() {
            if cluster_i.len() > nsplit {
                let neighbors_ij = cluster_neighbor_map(cluster_i, data, step.cut, step.sim);
                map_sizes[cluster_idx] = neighbors_ij.len();

                let second_neighbors_ij = NeighborMap::new();
                let mut new_clusters = engine::cluster(similarity, data, &neighbors_ij,
                                                       &second_neighbors_ij, step.cut,
                                                       step.sim, nkeep, mutual);

                // if the cluster count does not increase take the parent
                if new_clusters.is_empty() {
                    new_clusters.push(cluster_i.clone());
                } else if new_clusters.len() == 1 {
                    new_clusters[0] = cluster_i.clone();
                }
                hierarchic_clusters.push(new_clusters);
            } else {
                hierarchic_clusters.push(vec![cluster_i.clone()]);
            }
        }

        // flatten the level, children taking their parent's position
        let mut output: Vec<Vec<usize>> = Vec::new();
        for new_clusters in &hierarchic_clusters {
            for new_cluster in new_clusters { output.push(new_cluster.clone()); }
        }

        for cluster_idx in (0..hierarchic_clusters.len()).rev() {
            let children = hierarchic_clusters[cluster_idx].len();
            if children > 1 {
                leaves[cluster_idx] = step;
                leaves.splice(cluster_idx..cluster_idx, vec![step; children - 1]);
            }
        }
        *clusters = output;

        let clustered_points: usize = clusters.iter().map(|cluster_i| cluster_i.len()).sum();
        info!("step {} cut {:.4} sim {}: {} clusters hold {} frames ({:.1}%)",
              step.step, step.cut, step.sim, clusters.len(), clustered_points,
              100.0 * clustered_points as f32 / total_frames);

        // radius for the next hierarchical level
        step.cut *= bfactor;
        step.step += 1;

        enough_neighbor_lists = map_sizes.iter().any(|&count| count > 2 * nkeep);
    }

    leaves
}
