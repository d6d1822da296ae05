//! Perpendicular splitter
//!
//! Builds a buffered perpendicular through the nearest point on the main
//! flowline and splits it into a north ("top") and south ("bottom") half.
//! The halves are labeled upstream/downstream later; at this stage they
//! are purely geographic.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::geometry::segment_capsule;
use crate::locate::NearestFlowline;
use geo::{BooleanOps, BoundingRect, Coord, MultiPolygon, Rect};

/// The two halves of the buffered perpendicular split line
#[derive(Debug, Clone)]
pub struct SplitHalves {
    /// North half of the buffered perpendicular
    pub top: MultiPolygon<f64>,
    /// South half
    pub bottom: MultiPolygon<f64>,
}

/// Split the local buffer perpendicular to the flowline at the nearest
/// point.
///
/// The perpendicular direction comes from rotating the bracketing segment's
/// direction vector by 90 degrees; its extent is the raw segment delta
/// scaled by `length_factor / 2` on each side of the midpoint, buffered by
/// `perpendicular_buffer` into a capsule. The capsule's bounding box is cut
/// at mid-latitude into the two halves.
///
/// A zero-length bracketing segment leaves the perpendicular direction
/// undefined and yields [`AnalysisError::DegenerateGeometry`].
pub fn perpendicular_split(
    nearest: &NearestFlowline<'_>,
    config: &AnalysisConfig,
) -> Result<SplitHalves> {
    let coords = &nearest.flowline.line().0;
    let p1 = coords[nearest.segment];
    let p2 = coords[nearest.segment + 1];

    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    if dx.hypot(dy) < 1e-12 {
        return Err(AnalysisError::DegenerateGeometry {
            reason: format!(
                "bracketing vertices of flowline {} coincide at ({}, {})",
                nearest.flowline.id(),
                p1.x,
                p1.y
            ),
        });
    }

    let midpoint = Coord {
        x: (p1.x + p2.x) / 2.0,
        y: (p1.y + p2.y) / 2.0,
    };

    // Rotate (dx, dy) by 90 degrees and scale both ways from the midpoint
    let half = config.length_factor / 2.0;
    let e1 = Coord {
        x: midpoint.x - dy * half,
        y: midpoint.y + dx * half,
    };
    let e2 = Coord {
        x: midpoint.x + dy * half,
        y: midpoint.y - dx * half,
    };

    let buffered = segment_capsule(e1, e2, config.perpendicular_buffer, config.buffer_segments);
    let bbox = buffered
        .bounding_rect()
        .ok_or_else(|| AnalysisError::DegenerateGeometry {
            reason: "buffered perpendicular has no extent".to_string(),
        })?;

    let mid_lat = (bbox.min().y + bbox.max().y) / 2.0;
    let top_rect = Rect::new((bbox.min().x, mid_lat), (bbox.max().x, bbox.max().y)).to_polygon();
    let bottom_rect = Rect::new((bbox.min().x, bbox.min().y), (bbox.max().x, mid_lat)).to_polygon();

    Ok(SplitHalves {
        top: buffered.intersection(&top_rect),
        bottom: buffered.intersection(&bottom_rect),
    })
}
