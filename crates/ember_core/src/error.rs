//! Error types for the ember engine

use thiserror::Error;

/// Errors raised at construction or publish boundaries
///
/// Per-frame transient conditions (no mask yet, no camera frame yet) are not
/// errors; draw paths handle those with an early return.
#[derive(Error, Debug)]
pub enum EmberError {
    /// A construction parameter is outside its valid range
    #[error("invalid parameter: {what}")]
    InvalidParameter {
        /// Which parameter was rejected and why
        what: &'static str,
    },

    /// A generated mesh would exceed a hard resource limit
    #[error("{what}: {actual} exceeds limit of {limit}")]
    SizeLimitExceeded {
        /// What hit the limit
        what: &'static str,
        /// The maximum allowed value
        limit: usize,
        /// The value that was requested
        actual: usize,
    },

    /// A published pixel frame has unusable dimensions
    #[error("invalid frame dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Published width in pixels
        width: u32,
        /// Published height in pixels
        height: u32,
    },
}

/// Result type for ember operations
pub type Result<T> = std::result::Result<T, EmberError>;
