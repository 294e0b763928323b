//! Reconstruction of discretized trajectories from a clustering.

use log::warn;

/// Turns cluster membership into one label row per trajectory.
///
/// `traj_shapes` lists the per-trajectory frame counts of the concatenated
/// input. Every position starts at −1 (noise); a point assigned to cluster
/// `c` sets the label at its trajectory-local offset to `c`.
///
/// # Examples
/// ```rust
/// use mdcluster_clustering::discretize::discretize;
/// let clusters = vec![vec![0, 1, 2], vec![5, 6]];
/// let labels = discretize(&clusters, &[4, 4]);
/// assert_eq!(labels[0], [0, 0, 0, -1]);
/// assert_eq!(labels[1], [-1, 1, 1, -1]);
/// ```
pub fn discretize(clusters: &[Vec<usize>], traj_shapes: &[usize]) -> Vec<Vec<i32>> {
    let mut dtrajs: Vec<Vec<i32>> = traj_shapes.iter().map(|&shape| vec![-1; shape]).collect();

    for (cluster_idx, cluster_i) in clusters.iter().enumerate() {
        for &idx in cluster_i {
            // prefix-sum walk to locate the trajectory owning this point
            let mut concat = 0;
            let mut traj_idx = 0;
            while concat <= idx && traj_idx < traj_shapes.len() {
                concat += traj_shapes[traj_idx];
                traj_idx += 1;
            }
            if concat <= idx {
                warn!("point {} lies beyond the concatenated trajectories; if you read this message please report", idx);
                continue;
            }
            traj_idx -= 1;
            concat -= traj_shapes[traj_idx];

            dtrajs[traj_idx][idx - concat] = cluster_idx as i32;
        }
    }

    dtrajs
}
