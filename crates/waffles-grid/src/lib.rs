//! # waffles-grid
//!
//! Raster tiles and compositing primitives for the waffles DEM pipeline:
//!
//! - [`RasterTile`]: in-memory cell grid with geographic extent
//! - [`geotiff`]: GeoTIFF read/write (geotransform + GDAL_NODATA tags)
//! - [`merge`]: mosaic per-chunk tiles with overlap trimming
//! - [`filter`]: Gaussian smoothing with split-value passthrough
//! - [`clip`]: polygon masking
//! - [`resample`]: bilinear regridding

mod clip;
mod error;
mod filter;
pub mod geotiff;
mod merge;
mod resample;
mod tile;

pub use clip::{clip, ClipSpec};
pub use error::GridError;
pub use filter::{gaussian_filter, FilterSpec};
pub use merge::merge;
pub use resample::resample;
pub use tile::{RasterTile, DEFAULT_NODATA};

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
