//! Elevation-band masking
//!
//! Restricts an analysis area to the cells whose elevation sits inside a
//! band around the elevation at the analysis point, producing the binary
//! mask the later stages intersect against.

use crate::config::ElevationBand;
use crate::error::{AnalysisError, Result};
use crate::sources::ElevationSource;
use castorgis_core::{GeoTransform, Raster};
use geo::{BoundingRect, Contains, Point, Polygon};

/// Build a binary mask of the cells inside `clip` whose elevation lies in
/// `band` around the elevation at `point`.
///
/// The grid covers the clip polygon's bounding box at `cell_size`. A cell
/// is 1 when its center is inside the clip polygon, the source has data
/// there, and the value passes the band check; everything else is 0.
/// Fails with [`AnalysisError::ElevationSample`] when the surface has no
/// data at the analysis point itself, since no reference elevation exists.
pub fn elevation_band_mask(
    source: &dyn ElevationSource,
    point: Point<f64>,
    clip: &Polygon<f64>,
    band: ElevationBand,
    cell_size: f64,
) -> Result<Raster<u8>> {
    let reference = source
        .sample(point.x(), point.y())
        .ok_or(AnalysisError::ElevationSample {
            x: point.x(),
            y: point.y(),
        })?;

    let bbox = clip
        .bounding_rect()
        .ok_or_else(|| AnalysisError::DegenerateGeometry {
            reason: "clip polygon has no extent".to_string(),
        })?;

    let cols = ((bbox.max().x - bbox.min().x) / cell_size).ceil().max(1.0) as usize;
    let rows = ((bbox.max().y - bbox.min().y) / cell_size).ceil().max(1.0) as usize;

    let mut mask: Raster<u8> = Raster::new(rows, cols);
    mask.set_transform(GeoTransform::new(bbox.min().x, bbox.max().y, cell_size));
    mask.set_nodata(Some(0));

    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = mask.pixel_to_geo(col, row);
            if !clip.contains(&Point::new(x, y)) {
                continue;
            }
            if let Some(value) = source.sample(x, y) {
                if band.contains(reference, value) {
                    unsafe { mask.set_unchecked(row, col, 1) };
                }
            }
        }
    }
    Ok(mask)
}
