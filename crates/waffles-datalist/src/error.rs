//! Error types for datalist parsing and resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing or resolving datalists.
#[derive(Debug, Error)]
pub enum DatalistError {
    /// I/O error reading a datalist or data file.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A datalist includes itself, directly or through a chain.
    #[error("cyclic datalist inclusion at {path}")]
    CyclicDatalist {
        /// The datalist that was already open on the recursion stack.
        path: PathBuf,
    },

    /// A datalist entry line could not be parsed.
    #[error("could not parse entry {line:?} in {path}")]
    ParseEntry {
        /// The offending line.
        line: String,
        /// Datalist containing it.
        path: PathBuf,
    },

    /// An entry carries an unknown format code.
    #[error("unknown datalist format code {code} in {path}")]
    UnknownFormat {
        /// Format code from the entry.
        code: i32,
        /// Datalist containing the entry.
        path: PathBuf,
    },

    /// An entry's format could not be inferred from its extension.
    #[error("cannot infer format for entry {path}")]
    UnknownExtension {
        /// Entry path.
        path: PathBuf,
    },

    /// Raster metadata/read failure on a leaf source.
    #[error("raster source error: {0}")]
    Grid(#[from] waffles_grid::GridError),

    /// Region failure (spatial metadata geometry).
    #[error("region error: {0}")]
    Region(#[from] waffles_region::RegionError),

    /// JSON serialization failure (spatial metadata).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatalistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatalistError::Io {
            path: path.into(),
            source,
        }
    }
}
