//! On-disk representation of clusterings and discretized trajectories.
//!
//! A clustering written under the base path `foo.npy` spans five files:
//! the concatenated point ids (`foo.npy`), the per-cluster sizes
//! (`foo-shape.npy`), and the leaf records split into step index
//! (`foo-leaves.npy`), radius (`foo-leaves-cut.npy`, float32) and
//! similarity threshold (`foo-leaves-sim.npy`).

use mdcluster_clustering::ClusteringStep;

use crate::errors::ArrayIoError;
use crate::npy;
use crate::paths::derived_path;

/// Writes a clustering and its leaf records under the base path.
pub fn write_clusters(path: &str, clusters: &[Vec<usize>],
                      leaves: &[ClusteringStep]) -> Result<(), ArrayIoError> {
    let mut ids_accum: Vec<u32> = Vec::new();
    let mut shapes_accum: Vec<u32> = Vec::new();
    for cluster in clusters {
        shapes_accum.push(cluster.len() as u32);
        ids_accum.extend(cluster.iter().map(|&id| id as u32));
    }

    let steps_accum: Vec<u32> = leaves.iter().map(|leaf| leaf.step).collect();
    let cuts_accum: Vec<f32> = leaves.iter().map(|leaf| leaf.cut).collect();
    let sims_accum: Vec<u32> = leaves.iter().map(|leaf| leaf.sim as u32).collect();

    npy::save_u32(path, &ids_accum)?;
    npy::save_u32(&derived_path(path, "-shape"), &shapes_accum)?;
    npy::save_u32(&derived_path(path, "-leaves"), &steps_accum)?;
    npy::save_f32(&derived_path(path, "-leaves-cut"), &cuts_accum)?;
    npy::save_u32(&derived_path(path, "-leaves-sim"), &sims_accum)?;
    Ok(())
}

/// Reads a clustering previously written by [`write_clusters()`](write_clusters).
///
/// Any failure (a missing or malformed file, inconsistent sizes) surfaces
/// as an error so the caller can fall back to recomputing.
pub fn read_clusters(path: &str) -> Result<(Vec<Vec<usize>>, Vec<ClusteringStep>), ArrayIoError> {
    let (_, ids_accum) = npy::load_integers(path)?;
    let (_, shapes_accum) = npy::load_integers(&derived_path(path, "-shape"))?;
    let (_, steps_accum) = npy::load_integers(&derived_path(path, "-leaves"))?;
    let (_, cuts_accum) = npy::load_f32(&derived_path(path, "-leaves-cut"))?;
    let (_, sims_accum) = npy::load_integers(&derived_path(path, "-leaves-sim"))?;

    let declared: i64 = shapes_accum.iter().sum();
    if declared != ids_accum.len() as i64
        || steps_accum.len() != shapes_accum.len()
        || cuts_accum.len() != shapes_accum.len()
        || sims_accum.len() != shapes_accum.len() {
        return Err(ArrayIoError::ShapeMismatch {
            path: path.to_string(),
            found: vec![ids_accum.len(), shapes_accum.len()],
            expected: "matching cluster, shape and leaf files".to_string(),
        });
    }

    let mut clusters: Vec<Vec<usize>> = Vec::with_capacity(shapes_accum.len());
    let mut next = 0;
    for &size in &shapes_accum {
        let size = size as usize;
        let cluster: Vec<usize> = ids_accum[next..next + size].iter()
            .map(|&id| id as usize)
            .collect();
        clusters.push(cluster);
        next += size;
    }

    let leaves: Vec<ClusteringStep> = (0..shapes_accum.len())
        .map(|i| ClusteringStep::new(steps_accum[i] as u32, cuts_accum[i], sims_accum[i] as usize))
        .collect();

    Ok((clusters, leaves))
}

/// Writes discretized trajectories: the concatenated int32 label rows under
/// `path` and the per-trajectory lengths under the `-shape` companion.
pub fn write_dtrajs(path: &str, dtrajs: &[Vec<i32>]) -> Result<(), ArrayIoError> {
    let mut labels_accum: Vec<i32> = Vec::new();
    let mut shapes_accum: Vec<u32> = Vec::new();
    for dtraj in dtrajs {
        shapes_accum.push(dtraj.len() as u32);
        labels_accum.extend_from_slice(dtraj);
    }

    npy::save_i32(path, &labels_accum)?;
    npy::save_u32(&derived_path(path, "-shape"), &shapes_accum)?;
    Ok(())
}
