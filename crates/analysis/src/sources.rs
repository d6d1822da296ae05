//! Data source traits
//!
//! The pipeline reads elevation and imagery through these traits so tests
//! and callers can supply in-memory rasters, tiled files, or remote
//! catalogs without the analysis stages knowing the difference.

use castorgis_core::Raster;
use chrono::NaiveDate;
use geo::Rect;

/// Point-queryable elevation surface
pub trait ElevationSource {
    /// Elevation at a coordinate, or `None` where the surface has no data
    fn sample(&self, x: f64, y: f64) -> Option<f64>;
}

impl ElevationSource for Raster<f64> {
    fn sample(&self, x: f64, y: f64) -> Option<f64> {
        self.value_at(x, y)
    }
}

/// One month of co-registered observation bands over an analysis area.
///
/// Optical bands are expected at the optical ground sample distance,
/// thermal and evapotranspiration bands at the thermal one; the reducer
/// works per band and never resamples between them.
#[derive(Debug, Clone)]
pub struct MonthlyScene {
    pub year: i32,
    pub month: u32,
    pub green: Raster<f64>,
    pub red: Raster<f64>,
    pub nir: Raster<f64>,
    /// Land surface temperature
    pub lst: Raster<f64>,
    /// Evapotranspiration
    pub et: Raster<f64>,
}

/// Provider of monthly imagery for an analysis window
pub trait ImagerySource {
    /// Monthly scenes covering `bounds` between `start` and `end`
    /// (inclusive), in chronological order. Months with no usable
    /// observations are simply absent.
    fn monthly_scenes(&self, bounds: Rect<f64>, start: NaiveDate, end: NaiveDate)
        -> Vec<MonthlyScene>;
}
