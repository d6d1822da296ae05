//! Vector feature types for the dam-impact analysis
//!
//! All geometries live in one projected, metre-unit coordinate system.
//! Reprojection from geographic sources is an upstream I/O concern.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use geo_types::{LineString, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status tag of a survey point: dam or control location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointStatus {
    /// A surveyed beaver dam
    Positive,
    /// A non-dam control location on the same waterway network
    Negative,
}

impl fmt::Display for PointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointStatus::Positive => write!(f, "positive"),
            PointStatus::Negative => write!(f, "negative"),
        }
    }
}

/// A dam or control point. Immutable once created.
#[derive(Debug, Clone)]
pub struct SurveyPoint {
    /// Stable string id, e.g. "P3" or "N12"
    pub id: String,
    pub status: PointStatus,
    pub survey_date: NaiveDate,
    pub point: Point<f64>,
}

impl SurveyPoint {
    pub fn new(
        id: impl Into<String>,
        status: PointStatus,
        survey_date: NaiveDate,
        point: Point<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            survey_date,
            point,
        }
    }
}

/// A buffered analysis area around one survey point.
///
/// Carries the originating point's metadata; the polygon is created once at
/// buffer time and only ever intersected or clipped afterwards.
#[derive(Debug, Clone)]
pub struct AnalysisBox {
    pub id: String,
    pub status: PointStatus,
    pub survey_date: NaiveDate,
    pub point: Point<f64>,
    pub polygon: Polygon<f64>,
}

impl AnalysisBox {
    pub fn new(origin: &SurveyPoint, polygon: Polygon<f64>) -> Self {
        Self {
            id: origin.id.clone(),
            status: origin.status,
            survey_date: origin.survey_date,
            point: origin.point,
            polygon,
        }
    }
}

/// One polyline segment of a waterway network
#[derive(Debug, Clone)]
pub struct Flowline {
    id: u64,
    line: LineString<f64>,
    bbox: Rect<f64>,
}

impl Flowline {
    /// Create a flowline. Fails if the line has fewer than 2 vertices.
    pub fn new(id: u64, line: LineString<f64>) -> Result<Self> {
        if line.0.len() < 2 {
            return Err(Error::InvalidFlowline { id });
        }
        let bbox = line_bbox(&line);
        Ok(Self { id, line, bbox })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }

    /// Axis-aligned bounding box, cached at construction
    pub fn bbox(&self) -> Rect<f64> {
        self.bbox
    }
}

fn line_bbox(line: &LineString<f64>) -> Rect<f64> {
    let first = line.0[0];
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for c in &line.0 {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }
    Rect::new((min_x, min_y), (max_x, max_y))
}

/// A read-only set of flowlines.
///
/// No topological connectivity is guaranteed: segments may be disconnected,
/// overlapping or crossing, as delivered by upstream flowline datasets.
#[derive(Debug, Clone, Default)]
pub struct WaterwayNetwork {
    flowlines: Vec<Flowline>,
}

impl WaterwayNetwork {
    pub fn new(flowlines: Vec<Flowline>) -> Self {
        Self { flowlines }
    }

    pub fn len(&self) -> usize {
        self.flowlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flowlines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flowline> {
        self.flowlines.iter()
    }

    /// Coarse candidate filter: flowlines whose bounding box, expanded by
    /// `radius`, contains the point. A distance pass must follow; this only
    /// avoids scanning a whole regional dataset.
    pub fn candidates_near(&self, point: Point<f64>, radius: f64) -> Vec<&Flowline> {
        self.flowlines
            .iter()
            .filter(|f| {
                let b = f.bbox();
                point.x() >= b.min().x - radius
                    && point.x() <= b.max().x + radius
                    && point.y() >= b.min().y - radius
                    && point.y() <= b.max().y + radius
            })
            .collect()
    }
}
