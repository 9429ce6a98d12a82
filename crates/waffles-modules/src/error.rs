//! Error types for gridding modules.

use thiserror::Error;

/// Errors that can occur configuring or running a gridding module.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The requested module name is not registered.
    #[error("unknown module {name:?}; available modules: {known}")]
    UnknownModule {
        /// Requested name.
        name: String,
        /// Comma-separated registered module names.
        known: String,
    },

    /// A module option is unrecognized or malformed.
    #[error("invalid option for module {module}: {reason}")]
    InvalidOption {
        /// Module that rejected the option.
        module: String,
        /// What is wrong, naming the offending key(s).
        reason: String,
    },

    /// A required external tool is not installed.
    #[error("external tool {tool:?} is not available")]
    ToolMissing {
        /// Tool executable name.
        tool: String,
    },

    /// An external tool exited non-zero or produced unusable output.
    #[error("external tool {tool:?} failed (status {status:?}): {stderr}")]
    ExternalTool {
        /// Tool executable name.
        tool: String,
        /// Exit status code, if the process ran.
        status: Option<i32>,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// Source data access failure.
    #[error("datalist error: {0}")]
    Datalist(#[from] waffles_datalist::DatalistError),

    /// Raster read/write failure.
    #[error("grid error: {0}")]
    Grid(#[from] waffles_grid::GridError),

    /// I/O failure in a module working directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
