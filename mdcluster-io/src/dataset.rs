//! Loading of trajectory frame data.
//!
//! The input is a 3-D `(trajectories, frames, dims)` tensor of 32-bit
//! floats. A companion `-shape` file, when present, lists the individual
//! trajectory lengths of variable-length trajectories concatenated along
//! the frame axis.

use std::collections::BTreeMap;
use std::fs::File;

use log::info;

use crate::errors::ArrayIoError;
use crate::npy;
use crate::paths::derived_path;

/// A point set loaded for clustering, together with the trajectory
/// bookkeeping needed by mapping and discretization.
#[derive(Debug)]
pub struct FrameSet {
    /// One row per (possibly subsampled) frame, truncated to `ndims`
    pub points: Vec<Vec<f32>>,
    /// Per-trajectory frame counts after subsampling
    pub shapes: Vec<usize>,
    /// Maps each loaded row to its frame index in the unsliced input
    pub frame_map: BTreeMap<usize, usize>,
    /// Number of loaded frames
    pub total_frames: usize,
    /// Number of retained dimensions
    pub ndims: usize,
}

/// Checks whether a file can be opened for reading.
pub fn file_exists(path: &str) -> bool { File::open(path).is_ok() }

/// Loads the frame data under `path`.
///
/// When `<stem>-shape.<ext>` exists next to the data file, trajectories are
/// treated as variable-length and concatenated; otherwise every trajectory
/// of the tensor contributes the same number of frames.
///
/// # Arguments
/// * `path` - the npy data file
/// * `ntrajs` - keep at most this many trajectories
/// * `ndims` - keep at most this many dimensions per frame
/// * `slice` - subsampling stride (1 keeps every frame)
pub fn load_frames(path: &str, ntrajs: usize, ndims: usize,
                   slice: usize) -> Result<FrameSet, ArrayIoError> {
    if !file_exists(path) {
        return Err(ArrayIoError::MissingInput { path: path.to_string() });
    }
    let slice = slice.max(1);

    let shape_path = derived_path(path, "-shape");
    let set = if file_exists(&shape_path) {
        load_concatenated(path, &shape_path, ntrajs, ndims, slice)?
    } else {
        load_uniform(path, ntrajs, ndims, slice)?
    };
    info!("loaded {} frames of dimension {} from {}", set.total_frames, set.ndims, path);

    Ok(set)
}

fn tensor_dims(path: &str, tensor_shape: &[usize]) -> Result<(), ArrayIoError> {
    if tensor_shape.len() != 3 {
        return Err(ArrayIoError::ShapeMismatch {
            path: path.to_string(),
            found: tensor_shape.to_vec(),
            expected: "(trajectories, frames, dims)".to_string(),
        });
    }
    Ok(())
}

/// All trajectories share the frame count of the tensor's second axis.
fn load_uniform(path: &str, ntrajs: usize, ndims: usize,
                slice: usize) -> Result<FrameSet, ArrayIoError> {
    let (tensor_shape, flat) = npy::load_f32(path)?;
    tensor_dims(path, &tensor_shape)?;

    let n_trajs = tensor_shape[0].min(ntrajs);
    let frames_per_traj = tensor_shape[1] / slice;
    let dim = tensor_shape[2];
    let kept_dims = dim.min(ndims);

    let n_rows = n_trajs * frames_per_traj;
    let mut points: Vec<Vec<f32>> = Vec::with_capacity(n_rows);
    let mut frame_map: BTreeMap<usize, usize> = BTreeMap::new();
    for row in 0..n_rows {
        let src = row * slice * dim;
        points.push(flat[src..src + kept_dims].to_vec());
        frame_map.insert(row, row * slice);
    }

    Ok(FrameSet {
        points,
        shapes: vec![frames_per_traj; n_trajs],
        frame_map,
        total_frames: n_rows,
        ndims: kept_dims,
    })
}

/// Trajectories of individual lengths, concatenated along the frame axis.
fn load_concatenated(path: &str, shape_path: &str, ntrajs: usize, ndims: usize,
                     slice: usize) -> Result<FrameSet, ArrayIoError> {
    let (_, raw_shapes) = npy::load_integers(shape_path)?;
    let all_shapes: Vec<usize> = raw_shapes.into_iter().map(|s| s.max(0) as usize).collect();

    let (tensor_shape, flat) = npy::load_f32(path)?;
    tensor_dims(path, &tensor_shape)?;

    let dim = tensor_shape[2];
    let kept_dims = dim.min(ndims);
    let n_trajs = all_shapes.len().min(ntrajs);

    let available = tensor_shape[0] * tensor_shape[1];
    let declared: usize = all_shapes[..n_trajs].iter().sum();
    if declared > available {
        return Err(ArrayIoError::ShapeMismatch {
            path: shape_path.to_string(),
            found: all_shapes,
            expected: format!("trajectory lengths summing to at most {}", available),
        });
    }

    let sliced_shapes: Vec<usize> = all_shapes[..n_trajs].iter()
        .map(|&shape| if slice > 1 { shape / slice } else { shape })
        .collect();
    let n_rows: usize = sliced_shapes.iter().sum();

    let mut points: Vec<Vec<f32>> = Vec::with_capacity(n_rows);
    let mut frame_map: BTreeMap<usize, usize> = BTreeMap::new();
    let mut traj_begin = 0;
    let mut sliced_begin = 0;
    for traj in 0..n_trajs {
        for frame in 0..sliced_shapes[traj] {
            let src_row = traj_begin + frame * slice;
            let src = src_row * dim;
            points.push(flat[src..src + kept_dims].to_vec());
            frame_map.insert(sliced_begin + frame, src_row);
        }
        traj_begin += all_shapes[traj];
        sliced_begin += sliced_shapes[traj];
    }

    Ok(FrameSet {
        points,
        shapes: sliced_shapes,
        frame_map,
        total_frames: n_rows,
        ndims: kept_dims,
    })
}
