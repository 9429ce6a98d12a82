//! # waffles-region
//!
//! Geographic region handling for the waffles DEM pipeline:
//!
//! - [`Region`]: rectangular extent value type with parsing, buffering,
//!   extension and intersection tests
//! - [`geojson`]: per-feature region extraction and clip polygons from
//!   GeoJSON vector files
//! - [`chunk`]: partitioning a region into overlapping, independently
//!   processable sub-regions
//!
//! ## Examples
//!
//! ```
//! use waffles_region::Region;
//!
//! let region = Region::parse("-90/-89/29/30")?;
//! let proc_region = region.extend(20, 0.00083333);
//! assert!(proc_region.intersects(&region));
//! # Ok::<(), waffles_region::RegionError>(())
//! ```

mod chunk;
mod error;
pub mod geojson;
mod region;

pub use chunk::{chunk, Chunk, CHUNK_MARGIN_CELLS};
pub use error::RegionError;
pub use geojson::Polygon;
pub use region::Region;

/// Result type for region operations.
pub type Result<T> = std::result::Result<T, RegionError>;

/// Parse a region spec that is either four numeric bounds
/// (`xmin/xmax/ymin/ymax`) or a path to a GeoJSON polygon file.
///
/// A vector file yields one region per polygon feature (a multi-region
/// run); numeric bounds yield exactly one.
pub fn parse_region_spec(spec: &str) -> Result<Vec<Region>> {
    let path = std::path::Path::new(spec);
    if path.is_file() {
        geojson::read_regions(path)
    } else {
        Ok(vec![Region::parse(spec)?])
    }
}
