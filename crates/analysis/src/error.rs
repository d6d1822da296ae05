//! Error types for the analysis pipeline
//!
//! Point-level failures are non-recoverable for that point only: the
//! pipeline logs them, records a skip entry, and continues. No error is
//! ever downgraded to a numeric zero, since zero is a valid index,
//! temperature or evapotranspiration reading.

use thiserror::Error;

/// Errors raised while processing a single analysis point
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No waterway segment found within the search radius of the point.
    /// The point must be skipped, never substituted with a default geometry.
    #[error("no waterway segment within {radius} m of point ({x}, {y})")]
    NoNearbyFlowline { x: f64, y: f64, radius: f64 },

    /// The elevation source has no value at the sample location
    #[error("elevation sample failed at ({x}, {y}): no-data cell")]
    ElevationSample { x: f64, y: f64 },

    /// Geometry too degenerate to derive a flow direction from, e.g. a
    /// zero-length bracketing segment or unresolvable half labels
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    /// A vertex sub-path ended up with fewer than 2 coordinates even after
    /// the neighbor-borrowing fallback
    #[error("vertex sub-path has fewer than 2 coordinates after fallback")]
    InsufficientVertices,

    #[error(transparent)]
    Core(#[from] castorgis_core::Error),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
