//! # waffles-modules
//!
//! Pluggable gridding modules for the waffles DEM pipeline. A module
//! takes resolved elevation sources and a target lattice and returns a
//! raster tile; the pipeline composes the tiles afterwards.
//!
//! Native modules (`nearest`, `num`, `invdst`, `average`) grid in
//! process. The rest shell out: `surface` and `triangulate` to GMT,
//! `mbgrid` to MB-System, `vdatum` to the NOAA datum-conversion jar.
//!
//! ## Examples
//!
//! ```no_run
//! use waffles_modules::{parse_module_spec, ModuleRegistry};
//! use waffles_region::Region;
//!
//! let registry = ModuleRegistry::builtin();
//! let (name, opts) = parse_module_spec("invdst:power=2:radius=0.01")?;
//! let module = registry.get(&name)?;
//! module.validate(&opts)?;
//! let region = Region::parse("-90/-89/29/30")?;
//! let tile = module.generate(&[], &region, 0.001, 0.001, &opts)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod average;
mod common;
mod error;
mod external;
mod gmt;
mod invdst;
mod mbgrid;
mod nearest;
mod num;
mod options;
mod registry;
mod vdatum;

pub use error::ModuleError;
pub use external::tool_available;
pub use gmt::{gmt_available, gmt_grdfilter};
pub use mbgrid::mbgrid_available;
pub use options::{parse_module_spec, ModuleOptions};
pub use registry::{GriddingModule, ModuleRegistry};

/// Result type for module operations.
pub type Result<T> = std::result::Result<T, ModuleError>;
