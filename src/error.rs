//! Error types for the occlusion core.

use thiserror::Error;

/// Result type alias using [`SalError`].
pub type Result<T, E = SalError> = std::result::Result<T, E>;

/// Failures raised by the formatter, the alignment engine and the occlusion applicator.
///
/// Collaborator failures (detector, mask generator, saliency generator) are not wrapped here,
/// they travel through `anyhow::Error` untouched.
#[derive(Error, Debug)]
pub enum SalError {
    /// Counts or widths of arrays that must agree do not.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Alignment was asked to process zero images.
    #[error("Empty batch: at least one detection set is required")]
    EmptyBatch,

    /// A mask does not cover the image it is applied to.
    #[error("Invalid mask {index}: expected {expected:?}, got {got:?}")]
    InvalidMask {
        /// Position of the offending mask in the mask set.
        index: usize,
        /// Image spatial shape (height, width).
        expected: (usize, usize),
        /// Mask spatial shape (height, width).
        got: (usize, usize),
    },

    /// A per-channel fill does not match the image channel count.
    #[error("Invalid fill: expected {expected} channel values, got {got}")]
    InvalidFill {
        /// Image channel count.
        expected: usize,
        /// Number of fill values supplied.
        got: usize,
    },

    /// The worker pool for parallel occlusion could not be started.
    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
