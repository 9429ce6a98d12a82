//! # waffles-runner
//!
//! The waffles DEM generation pipeline and its command-line surface.
//!
//! A run resolves a datalist against the requested region, partitions
//! the processing region into chunks, grids each chunk on a worker
//! pool with the configured module, and composites the chunk tiles
//! into one distribution grid (clip, filter, resample, cut, write).

mod cli;
mod config;
mod error;
mod pipeline;

pub use cli::Cli;
pub use config::WaffleConfig;
pub use error::WafflesError;
pub use pipeline::run;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, WafflesError>;
