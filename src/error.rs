//! Error types for pit removal

use thiserror::Error;

/// Errors raised while depitting a DEM.
///
/// Cancellation is not an error, see [`crate::DepitOutcome`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepitError {
    #[error("Invalid raster dimensions: {rows} rows x {cols} columns")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Invalid resolution: {resx} x {resy} (must be finite and positive)")]
    InvalidResolution { resx: f64, resy: f64 },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Index out of bounds: col {col}, row {row} in raster of {cols} columns x {rows} rows")]
    IndexOutOfBounds {
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },

    /// No finite exit elevation could be found for a depression. This only
    /// happens on corrupted input.
    #[error("Found invalid exit value for depression {depression} seeded at col {col}, row {row}")]
    NoExit {
        col: usize,
        row: usize,
        depression: usize,
    },

    #[error("Pits still left after {passes} passes")]
    NotConverged { passes: usize },
}

/// Result type alias for depit operations
pub type Result<T> = std::result::Result<T, DepitError>;
