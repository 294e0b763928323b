use thiserror::Error;


/// Errors that may appear while using the mdcluster-io crate
#[derive(Debug, Error)]
pub enum ArrayIoError {
    #[error("input file {path} does not exist; did you forget the .npy extension?")]
    /// A required input file is absent
    MissingInput { path: String },

    #[error("{path} is not a readable npy file: {reason}")]
    /// The npy header could not be parsed
    BadHeader { path: String, reason: String },

    #[error("{path} holds {found} data, expected {expected}")]
    /// The npy payload has an unexpected element type
    DtypeMismatch { path: String, found: String, expected: String },

    #[error("{path} has shape {found:?}, expected {expected}")]
    /// The npy payload has an unexpected dimensionality
    ShapeMismatch { path: String, found: Vec<usize>, expected: String },

    #[error("General I/O error occurred while reading an input file")]
    /// I/O error occurred while reading an input file
    Io(#[from] std::io::Error),
}
