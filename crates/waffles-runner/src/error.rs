//! Top-level pipeline errors.

use thiserror::Error;
use waffles_region::Region;

/// Errors that can stop a waffles run.
#[derive(Debug, Error)]
pub enum WafflesError {
    /// Region spec parsing or geometry failure.
    #[error("region error: {0}")]
    Region(#[from] waffles_region::RegionError),

    /// Datalist resolution or data access failure.
    #[error("datalist error: {0}")]
    Datalist(#[from] waffles_datalist::DatalistError),

    /// Raster compositing or I/O failure.
    #[error("grid error: {0}")]
    Grid(#[from] waffles_grid::GridError),

    /// Gridding module configuration or execution failure.
    #[error("module error: {0}")]
    Module(#[from] waffles_modules::ModuleError),

    /// A chunk failed and the run is not in keep-going mode.
    #[error("chunk ({row},{col}) covering {region} failed: {source}")]
    Chunk {
        /// Chunk row index.
        row: usize,
        /// Chunk column index.
        col: usize,
        /// Chunk processing region.
        region: Region,
        /// The underlying module failure.
        source: waffles_modules::ModuleError,
    },

    /// Run configuration could not be read or written.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// The command line is missing or mixing required arguments.
    #[error("{0}")]
    Usage(String),

    /// Output or configuration file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
