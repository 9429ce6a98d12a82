//! # waffles-datalist
//!
//! MB-System style datalists for the waffles DEM pipeline: hierarchical,
//! weighted catalogs of heterogeneous elevation sources.
//!
//! A datalist is a plain-text file with one entry per line:
//!
//! ```text
//! /path/to/data format weight metadata,fields
//! ```
//!
//! where format `-1` nests another datalist, `168` is XYZ text and `200`
//! is a georeferenced raster. Resolution walks the catalog depth-first,
//! multiplying weights down the tree, pruning branches outside the query
//! region via cheap `.inf` sidecar metadata, and guarding against cyclic
//! inclusion.
//!
//! ## Examples
//!
//! ```no_run
//! use waffles_datalist::resolve;
//! use waffles_region::Region;
//!
//! let region = Region::parse("-90/-89/29/30")?;
//! let sources = resolve("gulf.datalist".as_ref(), &region)?;
//! for source in &sources {
//!     println!("{} (weight {})", source.path.display(), source.weight);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod entry;
mod error;
pub mod inf;
mod points;
mod resolver;

pub use archive::{archive, spatial_metadata, write_spatial_metadata};
pub use entry::{DatalistEntry, ResolvedSource, SourceFormat};
pub use error::DatalistError;
pub use points::{parse_xyz_line, read_points, Point};
pub use resolver::resolve;

/// Result type for datalist operations.
pub type Result<T> = std::result::Result<T, DatalistError>;
