use thiserror::Error;


/// Errors that may appear while using the mdcluster-clustering crate
#[derive(Debug, Error)]
pub enum ClusteringError {
    #[error("input data set is empty")]
    /// The input holds no points at all
    EmptyData,

    #[error("input points have zero dimensions")]
    /// The input points carry no coordinates
    ZeroDimensions,

    #[error("cutoff radius must be positive, got {cut}")]
    /// The neighborhood radius is zero or negative
    InvalidCutoff { cut: f32 },

    #[error("similarity threshold must be at least 2, got {sim}")]
    /// The similarity threshold is too small to be meaningful
    InvalidSimilarity { sim: usize },

    #[error("Nkeep must fall within [2, {n_points}], got {nkeep}")]
    /// The minimum retained cluster size is outside the valid range
    InvalidNkeep { nkeep: i64, n_points: usize },
}

/// Checks the clustering parameters a caller passed in.
///
/// Library functions themselves are total; drivers call this once at the
/// boundary before starting a run.
pub fn validate_input(data: &[Vec<f32>], cut: f32, sim: usize, nkeep: i64) -> Result<(), ClusteringError> {
    if data.is_empty() { return Err(ClusteringError::EmptyData); }
    if data[0].is_empty() { return Err(ClusteringError::ZeroDimensions); }
    if cut <= 0.0 { return Err(ClusteringError::InvalidCutoff { cut }); }
    if sim < 2 { return Err(ClusteringError::InvalidSimilarity { sim }); }
    if nkeep < 2 || nkeep > data.len() as i64 {
        return Err(ClusteringError::InvalidNkeep { nkeep, n_points: data.len() });
    }

    Ok(())
}
