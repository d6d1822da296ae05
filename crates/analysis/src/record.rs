//! Output records
//!
//! One row per analysis point per observation month, shaped for direct
//! serialization to CSV or JSON.

use castorgis_core::PointStatus;
use serde::Serialize;

/// Monthly metrics averaged over a point's whole analysis buffer
#[derive(Debug, Clone, Serialize)]
pub struct MetricRecord {
    pub point_id: String,
    pub status: PointStatus,
    pub year: i32,
    pub month: u32,
    pub ndvi: Option<f64>,
    pub ndwi: Option<f64>,
    pub lst: Option<f64>,
    pub et: Option<f64>,
}

/// Monthly metrics split into upstream and downstream regions
#[derive(Debug, Clone, Serialize)]
pub struct FlowMetricRecord {
    pub point_id: String,
    pub status: PointStatus,
    pub year: i32,
    pub month: u32,
    pub ndvi_up: Option<f64>,
    pub ndvi_down: Option<f64>,
    pub ndwi_up: Option<f64>,
    pub ndwi_down: Option<f64>,
    pub lst_up: Option<f64>,
    pub lst_down: Option<f64>,
    pub et_up: Option<f64>,
    pub et_down: Option<f64>,
}
