//! Nearest-flowline locator
//!
//! Finds the single closest waterway segment to an analysis point, bounded
//! by a search radius so continental datasets are never scanned in full.

use crate::error::{AnalysisError, Result};
use crate::geometry::{nearest_on_line, NearestOnLine};
use castorgis_core::{Flowline, WaterwayNetwork};
use geo::{Coord, Point};

/// The nearest flowline to a query point, with the exact nearest point on
/// it and the segment that contains that point.
#[derive(Debug, Clone, Copy)]
pub struct NearestFlowline<'a> {
    pub flowline: &'a Flowline,
    /// Exact nearest coordinate on the flowline
    pub nearest: Coord<f64>,
    /// Index of the first of the two vertices bracketing `nearest`
    pub segment: usize,
    pub distance: f64,
}

/// Find the nearest flowline within `search_radius` of `point`.
///
/// Distance ties are broken by the lowest flowline id, so results are
/// stable across runs and input orderings. Returns
/// [`AnalysisError::NoNearbyFlowline`] when nothing qualifies; callers must
/// skip the point rather than substitute a default geometry.
pub fn nearest_flowline<'a>(
    point: Point<f64>,
    network: &'a WaterwayNetwork,
    search_radius: f64,
) -> Result<NearestFlowline<'a>> {
    let p = Coord {
        x: point.x(),
        y: point.y(),
    };

    let mut best: Option<(NearestOnLine, &Flowline)> = None;
    for flowline in network.candidates_near(point, search_radius) {
        let near = nearest_on_line(flowline.line(), p);
        if near.distance > search_radius {
            continue;
        }

        best = match best {
            None => Some((near, flowline)),
            Some((b, bf)) => {
                if near.distance < b.distance
                    || (near.distance == b.distance && flowline.id() < bf.id())
                {
                    Some((near, flowline))
                } else {
                    Some((b, bf))
                }
            }
        };
    }

    match best {
        Some((near, flowline)) => Ok(NearestFlowline {
            flowline,
            nearest: near.coord,
            segment: near.segment,
            distance: near.distance,
        }),
        None => Err(AnalysisError::NoNearbyFlowline {
            x: point.x(),
            y: point.y(),
            radius: search_radius,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn network() -> WaterwayNetwork {
        WaterwayNetwork::new(vec![
            Flowline::new(7, line_string![(x: 0.0, y: 10.0), (x: 100.0, y: 10.0)]).unwrap(),
            Flowline::new(3, line_string![(x: 0.0, y: 40.0), (x: 100.0, y: 40.0)]).unwrap(),
        ])
    }

    #[test]
    fn test_picks_closest_feature() {
        let network = network();
        let found = nearest_flowline(Point::new(50.0, 0.0), &network, 100.0).unwrap();
        assert_eq!(found.flowline.id(), 7);
        assert_eq!(found.nearest, Coord { x: 50.0, y: 10.0 });
        assert!((found.distance - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_breaks_by_lowest_id() {
        // Equidistant between the two lines (y = 25)
        let network = network();
        let found = nearest_flowline(Point::new(50.0, 25.0), &network, 100.0).unwrap();
        assert_eq!(found.flowline.id(), 3);
    }

    #[test]
    fn test_no_candidate_within_radius() {
        let err = nearest_flowline(Point::new(50.0, 500.0), &network(), 100.0).unwrap_err();
        assert!(matches!(err, AnalysisError::NoNearbyFlowline { .. }));
    }

    #[test]
    fn test_radius_is_exact_not_bbox() {
        // Within the bbox prefilter but outside the true distance
        let net = WaterwayNetwork::new(vec![Flowline::new(
            1,
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
        )
        .unwrap()]);
        // (60, 40) is inside the expanded bbox but ~64 m from the line
        let err = nearest_flowline(Point::new(60.0, 40.0), &net, 50.0).unwrap_err();
        assert!(matches!(err, AnalysisError::NoNearbyFlowline { .. }));
    }
}
