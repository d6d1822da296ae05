//! # CastorGIS Analysis
//!
//! Flow-classification and impact-metric pipeline for beaver dam analysis.
//!
//! Given surveyed dam (and control) points and a waterway line network, the
//! pipeline buffers each point, finds its nearest flowline, splits the local
//! buffer into upstream and downstream halves with a perpendicular through
//! the nearest point, classifies the surrounding flowline segments by
//! iterative spatial propagation, builds elevation-masked upstream and
//! downstream raster regions, and reduces spectral/thermal imagery bands to
//! one metric record per point and month.
//!
//! ## Module map
//!
//! - [`locate`]: nearest flowline and nearest point on it
//! - [`split`]: perpendicular buffer split into top/bottom halves
//! - [`partition`]: upstream/downstream vertex partition of the flowline
//! - [`label`]: flow-direction labeling and multi-pass propagation
//! - [`region`]: buffered, exclusion-masked raster region construction
//! - [`elevation`]: elevation-band masking around the survey point
//! - [`imagery`]: spectral indices (NDVI, green NDWI)
//! - [`reduce`]: masked spatial means at band resolution
//! - [`pipeline`]: batched per-point orchestration and records

pub mod config;
pub mod elevation;
pub mod error;
pub mod geometry;
pub mod imagery;
pub mod label;
pub mod locate;
pub mod partition;
pub mod pipeline;
pub mod record;
pub mod reduce;
pub mod region;
pub mod sources;
pub mod split;

pub use config::{AnalysisConfig, ElevationBand};
pub use error::{AnalysisError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{AnalysisConfig, ElevationBand};
    pub use crate::error::{AnalysisError, Result};
    pub use crate::pipeline::{
        analyze_combined, analyze_up_downstream, make_boxes, partition_flow, AnalysisOutput,
        FlowPartition, SkippedPoint,
    };
    pub use crate::record::{FlowMetricRecord, MetricRecord};
    pub use crate::sources::{ElevationSource, ImagerySource, MonthlyScene};
    pub use castorgis_core::prelude::*;
}
