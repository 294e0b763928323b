//! Array-file input and output for the mdcluster package: npy tensors of
//! trajectory frames, cluster files with their leaf records, discretized
//! trajectories and the backup naming of outputs.

pub mod errors;
pub mod npy;
pub mod dataset;
pub mod paths;
pub mod clusters;

// re-export the symbols to the top-most level of the crate's name space
pub use errors::ArrayIoError;
pub use dataset::{file_exists, load_frames, FrameSet};
pub use paths::{derived_path, resolve_output};
pub use clusters::{read_clusters, write_clusters, write_dtrajs};
