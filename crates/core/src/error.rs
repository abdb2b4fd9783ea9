//! Error types for driftlines.
//!
//! The animation core itself never surfaces errors to its host; these cover
//! the auxiliary paths (color parsing, pixel surfaces, snapshot output).

use thiserror::Error;

/// Errors produced outside the per-frame animation path.
#[derive(Debug, Error)]
pub enum WaveError {
    /// Width or height was zero (or overflowed) when allocating a surface.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Writing output (e.g. a PNG snapshot) failed.
    #[error("I/O error: {0}")]
    Io(String),
}
