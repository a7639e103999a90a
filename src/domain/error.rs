//! Domain error types

use thiserror::Error;

/// Errors raised by the signal-processing kernels
///
/// Every variant is detected at the call boundary, before any output
/// buffer is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigprocError {
    /// A length or headroom relation between arguments was violated
    #[error("Invalid length for `{arg}`: expected {expected}, got {got}")]
    InvalidLength {
        arg: &'static str,
        expected: usize,
        got: usize,
    },

    /// The real-only / complex flag contract was violated
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Storage for a vector could not be obtained
    #[error("Allocation of {requested} samples failed")]
    Allocation { requested: usize },

    /// The transform cannot be built for this size
    #[error("Unsupported transform size {size}: {reason}")]
    UnsupportedSize { size: usize, reason: &'static str },

    /// A filter design parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Release was called on a vector that only borrows its storage
    #[error("Vector does not own its storage")]
    NotOwner,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for kernel operations
pub type SigprocResult<T> = Result<T, SigprocError>;
