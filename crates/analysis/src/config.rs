//! Pipeline configuration
//!
//! All distances are in the linear unit of the input CRS (metres). The
//! defaults reproduce the survey tool's operational constants.

use serde::{Deserialize, Serialize};

/// Inclusive elevation band around a reference elevation.
///
/// A cell with value `v` is inside the band when
/// `reference - lower <= v <= reference + upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationBand {
    /// Metres above the reference elevation
    pub upper: f64,
    /// Metres below the reference elevation
    pub lower: f64,
}

impl ElevationBand {
    pub fn new(upper: f64, lower: f64) -> Self {
        Self { upper, lower }
    }

    /// Whether `value` lies within the band around `reference`
    pub fn contains(&self, reference: f64, value: f64) -> bool {
        value >= reference - self.lower && value <= reference + self.upper
    }
}

/// Explicit configuration object passed through the pipeline.
///
/// Replaces ambient session state: every stage receives the values it needs
/// from this struct, and nothing is process-global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Radius of the per-point analysis buffer for combined analysis (m)
    pub buffer_radius: f64,
    /// Radius of the local area examined for flow-direction analysis (m)
    pub flow_buffer_radius: f64,
    /// Candidate search radius for the nearest-flowline locator (m)
    pub search_radius: f64,
    /// Buffer distance applied to the perpendicular split line (m)
    pub perpendicular_buffer: f64,
    /// Scale factor for the perpendicular line's half-extent
    pub length_factor: f64,
    /// Buffer distance applied to classified flow networks (m)
    pub region_buffer: f64,
    /// Maximum flow-classification propagation passes
    pub max_passes: usize,
    /// Error margin for intersection tests during labeling (m)
    pub intersection_margin: f64,
    /// Ground sample distance of optical index bands, also the cell size of
    /// the elevation and region masks (m). Thermal and ET bands arrive on
    /// their own grid and are reduced at it without resampling.
    pub optical_scale: f64,
    /// Points per sequential processing batch
    pub batch_size: usize,
    /// Elevation band for combined (whole-buffer) analysis
    pub combined_band: ElevationBand,
    /// Elevation band for upstream/downstream analysis
    pub flow_band: ElevationBand,
    /// Segments used to approximate circular arcs when buffering
    pub buffer_segments: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            buffer_radius: 150.0,
            flow_buffer_radius: 200.0,
            search_radius: 100.0,
            perpendicular_buffer: 130.0,
            length_factor: 10.0,
            region_buffer: 100.0,
            max_passes: 3,
            intersection_margin: 1.0,
            optical_scale: 10.0,
            batch_size: 10,
            combined_band: ElevationBand::new(3.0, 5.0),
            flow_band: ElevationBand::new(3.0, 10.0),
            buffer_segments: 32,
        }
    }
}
