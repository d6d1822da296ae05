//! # CastorGIS Core
//!
//! Core types for the CastorGIS beaver-dam impact library.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid
//! - `GeoTransform`: Affine transformation for georeferencing
//! - Vector feature types: survey points, analysis boxes, flowlines
//! - Crate-wide error handling

pub mod error;
pub mod raster;
pub mod vector;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::{AnalysisBox, Flowline, PointStatus, SurveyPoint, WaterwayNetwork};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::{
        AnalysisBox, Flowline, PointStatus, SurveyPoint, WaterwayNetwork,
    };
}
