//! Error types for region handling.

use thiserror::Error;

/// Errors that can occur when parsing or manipulating regions.
#[derive(Debug, Error)]
pub enum RegionError {
    /// Bounds are degenerate (min >= max) or non-finite.
    #[error("invalid region: xmin {xmin} xmax {xmax} ymin {ymin} ymax {ymax}")]
    InvalidRegion {
        /// West bound.
        xmin: f64,
        /// East bound.
        xmax: f64,
        /// South bound.
        ymin: f64,
        /// North bound.
        ymax: f64,
    },

    /// A region string could not be parsed.
    #[error("could not parse region from {0:?}")]
    UnparsableRegion(String),

    /// A vector region file could not be read or held no polygon features.
    #[error("no usable polygon features in {path}: {reason}")]
    InvalidVectorFile {
        /// Path of the vector file.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// I/O error reading a vector file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error reading a vector file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
