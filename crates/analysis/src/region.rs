//! Flow-region masks
//!
//! Turns the classified upstream/downstream networks into raster masks on
//! the elevation grid: a cell belongs to a region when it sits inside the
//! buffered network, outside the opposite split half, and inside the
//! elevation band mask.

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::geometry::{buffer_lines, rasterize};
use crate::label::{ClassifiedNetwork, LabeledHalves};
use castorgis_core::Raster;
use geo::{Contains, Point};

/// Upstream and downstream analysis masks, aligned to the elevation grid
#[derive(Debug, Clone)]
pub struct FlowRegions {
    pub upstream: Raster<u8>,
    pub downstream: Raster<u8>,
}

impl FlowRegions {
    /// Whether either region ended up with no usable cells
    pub fn has_empty_region(&self) -> bool {
        self.upstream.count_ones() == 0 || self.downstream.count_ones() == 0
    }
}

/// Build the upstream and downstream region masks.
///
/// Each classified network is buffered by `region_buffer` and rasterized
/// onto the elevation mask's grid. Cells falling inside the opposite split
/// half are removed from each region, so the two masks never overlap near
/// the split, and cells outside the elevation band are removed from both.
pub fn build_regions(
    network: &ClassifiedNetwork,
    halves: &LabeledHalves,
    elevation_mask: &Raster<u8>,
    config: &AnalysisConfig,
) -> Result<FlowRegions> {
    let transform = *elevation_mask.transform();
    let (rows, cols) = elevation_mask.shape();

    let up_buffer = buffer_lines(&network.upstream, config.region_buffer, config.buffer_segments);
    let down_buffer = buffer_lines(
        &network.downstream,
        config.region_buffer,
        config.buffer_segments,
    );

    let mut upstream = rasterize(&up_buffer, transform, rows, cols);
    let mut downstream = rasterize(&down_buffer, transform, rows, cols);

    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = transform.pixel_to_geo(col, row);
            let p = Point::new(x, y);
            unsafe {
                if upstream.get_unchecked(row, col) == 1
                    && halves.downstream_half.contains(&p)
                {
                    upstream.set_unchecked(row, col, 0);
                }
                if downstream.get_unchecked(row, col) == 1 && halves.upstream_half.contains(&p) {
                    downstream.set_unchecked(row, col, 0);
                }
            }
        }
    }

    Ok(FlowRegions {
        upstream: upstream.mask_and(elevation_mask)?,
        downstream: downstream.mask_and(elevation_mask)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use castorgis_core::GeoTransform;
    use geo::{line_string, MultiPolygon, Rect};

    fn rect_mp(min: (f64, f64), max: (f64, f64)) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Rect::new(min, max).to_polygon()])
    }

    /// Regions built for a straight north-south river never overlap: the
    /// opposite-half exclusion carves each side back from the split.
    #[test]
    fn test_regions_are_disjoint() {
        let network = ClassifiedNetwork {
            upstream: vec![line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 400.0)]],
            downstream: vec![line_string![(x: 0.0, y: 0.0), (x: 0.0, y: -400.0)]],
            unclassified: 0,
        };
        let halves = LabeledHalves {
            upstream_half: rect_mp((-130.0, 0.0), (130.0, 130.0)),
            downstream_half: rect_mp((-130.0, -130.0), (130.0, 0.0)),
        };

        // 50 m grid over [-200, 200] x [-500, 500], elevation passes everywhere
        let transform = GeoTransform::new(-200.0, 500.0, 50.0);
        let mut elevation_mask: Raster<u8> = Raster::filled(20, 8, 1);
        elevation_mask.set_transform(transform);
        elevation_mask.set_nodata(Some(0));

        let regions = build_regions(&network, &halves, &elevation_mask, &AnalysisConfig::default())
            .unwrap();

        assert!(regions.upstream.count_ones() > 0);
        assert!(regions.downstream.count_ones() > 0);
        for row in 0..20 {
            for col in 0..8 {
                let both = regions.upstream.get(row, col).unwrap() == 1
                    && regions.downstream.get(row, col).unwrap() == 1;
                assert!(!both, "overlap at ({row}, {col})");
            }
        }
        assert!(!regions.has_empty_region());
    }

    /// Cells failing the elevation band never enter a region.
    #[test]
    fn test_elevation_mask_is_applied() {
        let network = ClassifiedNetwork {
            upstream: vec![line_string![(x: 0.0, y: 100.0), (x: 0.0, y: 400.0)]],
            downstream: vec![line_string![(x: 0.0, y: -100.0), (x: 0.0, y: -400.0)]],
            unclassified: 0,
        };
        let halves = LabeledHalves {
            upstream_half: rect_mp((-130.0, 0.0), (130.0, 130.0)),
            downstream_half: rect_mp((-130.0, -130.0), (130.0, 0.0)),
        };

        let transform = GeoTransform::new(-200.0, 500.0, 50.0);
        let mut elevation_mask: Raster<u8> = Raster::filled(20, 8, 0);
        elevation_mask.set_transform(transform);
        elevation_mask.set_nodata(Some(0));

        let regions = build_regions(&network, &halves, &elevation_mask, &AnalysisConfig::default())
            .unwrap();
        assert_eq!(regions.upstream.count_ones(), 0);
        assert_eq!(regions.downstream.count_ones(), 0);
        assert!(regions.has_empty_region());
    }
}
