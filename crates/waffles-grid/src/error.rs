//! Error types for raster grid I/O and compositing.

use thiserror::Error;

/// Errors that can occur reading, writing or transforming raster grids.
#[derive(Debug, Error)]
pub enum GridError {
    /// I/O error on the underlying grid file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF encode/decode error.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// The file is missing required GeoTIFF tags.
    #[error("invalid GeoTIFF: {0}")]
    InvalidGeoTiff(String),

    /// Unsupported sample type in the TIFF file.
    #[error("unsupported TIFF data type: {0}")]
    UnsupportedDataType(String),

    /// Tile geometry mismatch (e.g. crop region outside the tile).
    #[error("raster geometry error: {0}")]
    Geometry(String),

    /// A filter spec string could not be parsed.
    #[error("could not parse filter spec {0:?}")]
    InvalidFilterSpec(String),

    /// A clip spec string could not be parsed.
    #[error("could not parse clip spec {0:?}")]
    InvalidClipSpec(String),

    /// Clip polygon file error.
    #[error("clip polygon error: {0}")]
    ClipPolygon(#[from] waffles_region::RegionError),
}
