//! Flow-direction labeling
//!
//! Assigns the geographic split halves to the upstream/downstream
//! sub-paths, then classifies the remaining nearby flowlines by iterative
//! propagation: a line touching exactly one classified side joins it, and
//! each pass re-examines the lines the previous one left pending.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::geometry::polygon_within_margin;
use crate::split::SplitHalves;
use geo::{LineString, MultiPolygon};
use tracing::{debug, warn};

/// Which flow side a geometry was matched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowLabel {
    Upstream,
    Downstream,
    /// Touches both sides; resolved by inference or deferred
    Both,
    /// Touches neither side
    Unknown,
}

/// The split halves after labeling: one per flow direction
#[derive(Debug, Clone)]
pub struct LabeledHalves {
    pub upstream_half: MultiPolygon<f64>,
    pub downstream_half: MultiPolygon<f64>,
}

/// Nearby flowlines classified by flow direction
#[derive(Debug, Clone)]
pub struct ClassifiedNetwork {
    /// The upstream sub-path plus every line classified upstream
    pub upstream: Vec<LineString<f64>>,
    /// The downstream sub-path plus every line classified downstream
    pub downstream: Vec<LineString<f64>>,
    /// Lines still pending after the final pass
    pub unclassified: usize,
}

fn label_against(
    half: &MultiPolygon<f64>,
    upstream: &LineString<f64>,
    downstream: &LineString<f64>,
    margin: f64,
) -> FlowLabel {
    let up = polygon_within_margin(half, upstream, margin);
    let down = polygon_within_margin(half, downstream, margin);
    match (up, down) {
        (true, true) => FlowLabel::Both,
        (true, false) => FlowLabel::Upstream,
        (false, true) => FlowLabel::Downstream,
        (false, false) => FlowLabel::Unknown,
    }
}

/// Assign the top/bottom halves to the upstream/downstream sub-paths.
///
/// Each half is matched against both sub-paths within the intersection
/// margin. A half touching both sides is resolved to the opposite of the
/// other half's unambiguous label. Halves that end up unlabeled or on the
/// same side cannot be assigned and fail with
/// [`AnalysisError::DegenerateGeometry`].
pub fn label_halves(
    halves: &SplitHalves,
    upstream: &LineString<f64>,
    downstream: &LineString<f64>,
    config: &AnalysisConfig,
) -> Result<LabeledHalves> {
    let mut top = label_against(&halves.top, upstream, downstream, config.intersection_margin);
    let mut bottom = label_against(
        &halves.bottom,
        upstream,
        downstream,
        config.intersection_margin,
    );

    // A single ambiguous half takes the side the other one did not
    if top == FlowLabel::Both && bottom == FlowLabel::Upstream {
        top = FlowLabel::Downstream;
    } else if top == FlowLabel::Both && bottom == FlowLabel::Downstream {
        top = FlowLabel::Upstream;
    } else if bottom == FlowLabel::Both && top == FlowLabel::Upstream {
        bottom = FlowLabel::Downstream;
    } else if bottom == FlowLabel::Both && top == FlowLabel::Downstream {
        bottom = FlowLabel::Upstream;
    }

    match (top, bottom) {
        (FlowLabel::Upstream, FlowLabel::Downstream) => Ok(LabeledHalves {
            upstream_half: halves.top.clone(),
            downstream_half: halves.bottom.clone(),
        }),
        (FlowLabel::Downstream, FlowLabel::Upstream) => Ok(LabeledHalves {
            upstream_half: halves.bottom.clone(),
            downstream_half: halves.top.clone(),
        }),
        (t, b) => Err(AnalysisError::DegenerateGeometry {
            reason: format!("split halves could not be assigned flow directions ({t:?}/{b:?})"),
        }),
    }
}

/// Classify the other nearby flowlines as upstream or downstream.
///
/// Each pass matches every still-pending line against a snapshot of the
/// networks built so far: a line within the margin of exactly one side is
/// added to it, a line touching both or neither stays pending for the next
/// pass. Stops early when a pass classifies nothing. Lines still pending
/// after `max_passes` are counted and excluded from both networks.
pub fn propagate_classification(
    upstream_line: LineString<f64>,
    downstream_line: LineString<f64>,
    others: Vec<LineString<f64>>,
    config: &AnalysisConfig,
) -> ClassifiedNetwork {
    let margin = config.intersection_margin;
    let mut upstream = vec![upstream_line];
    let mut downstream = vec![downstream_line];
    let mut pending = others;

    for pass in 0..config.max_passes {
        if pending.is_empty() {
            break;
        }

        let up_snapshot = upstream.clone();
        let down_snapshot = downstream.clone();
        let near_any = |nets: &[LineString<f64>], line: &LineString<f64>| {
            nets.iter()
                .any(|n| crate::geometry::lines_within_margin(n, line, margin))
        };

        let mut still_pending = Vec::with_capacity(pending.len());
        for line in pending {
            let up = near_any(&up_snapshot, &line);
            let down = near_any(&down_snapshot, &line);
            match (up, down) {
                (true, false) => upstream.push(line),
                (false, true) => downstream.push(line),
                _ => still_pending.push(line),
            }
        }

        let classified = up_snapshot.len() + down_snapshot.len();
        let now = upstream.len() + downstream.len();
        debug!(
            pass = pass + 1,
            classified = now - classified,
            pending = still_pending.len(),
            "flow classification pass"
        );

        pending = still_pending;
        if now == classified {
            break;
        }
    }

    if !pending.is_empty() {
        warn!(
            count = pending.len(),
            "flowlines left unclassified after {} passes", config.max_passes
        );
    }

    ClassifiedNetwork {
        upstream,
        downstream,
        unclassified: pending.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, MultiPolygon, Rect};

    fn rect_mp(min: (f64, f64), max: (f64, f64)) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Rect::new(min, max).to_polygon()])
    }

    #[test]
    fn test_halves_take_the_side_they_touch() {
        // North-south river split at y = 0: top half must follow whichever
        // sub-path reaches into it.
        let halves = SplitHalves {
            top: rect_mp((-100.0, 0.0), (100.0, 130.0)),
            bottom: rect_mp((-100.0, -130.0), (100.0, 0.0)),
        };
        let up = line_string![(x: 0.0, y: 500.0), (x: 0.0, y: 10.0)];
        let down = line_string![(x: 0.0, y: -10.0), (x: 0.0, y: -500.0)];

        let labeled = label_halves(&halves, &up, &down, &AnalysisConfig::default()).unwrap();
        assert_eq!(labeled.upstream_half, halves.top);
        assert_eq!(labeled.downstream_half, halves.bottom);

        // Swapped sub-paths swap the assignment
        let labeled = label_halves(&halves, &down, &up, &AnalysisConfig::default()).unwrap();
        assert_eq!(labeled.upstream_half, halves.bottom);
        assert_eq!(labeled.downstream_half, halves.top);
    }

    #[test]
    fn test_ambiguous_half_resolved_by_opposite() {
        // The upstream sub-path crosses the split and touches both halves;
        // the bottom half is unambiguous, so the top must go upstream.
        let halves = SplitHalves {
            top: rect_mp((-100.0, 0.0), (100.0, 130.0)),
            bottom: rect_mp((-100.0, -130.0), (100.0, 0.0)),
        };
        let up = line_string![(x: 0.0, y: 500.0), (x: 0.0, y: -5.0)];
        let down = line_string![(x: 0.0, y: -10.0), (x: 0.0, y: -500.0)];

        let labeled = label_halves(&halves, &up, &down, &AnalysisConfig::default()).unwrap();
        assert_eq!(labeled.upstream_half, halves.top);
        assert_eq!(labeled.downstream_half, halves.bottom);
    }

    #[test]
    fn test_unresolvable_halves_fail() {
        // Neither sub-path comes near either half
        let halves = SplitHalves {
            top: rect_mp((1000.0, 1000.0), (1100.0, 1100.0)),
            bottom: rect_mp((2000.0, 2000.0), (2100.0, 2100.0)),
        };
        let up = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        let down = line_string![(x: 20.0, y: 0.0), (x: 30.0, y: 0.0)];

        let err = label_halves(&halves, &up, &down, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_tributary_chain_classified_over_two_passes() {
        // Three branching tributaries: `a` touches the upstream sub-path,
        // `b` and `c` only touch `a`, so the first pass classifies `a`
        // alone and leaves two segments pending for the second.
        let up = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 100.0)];
        let down = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: -100.0)];
        let a = line_string![(x: 0.0, y: 100.0), (x: 50.0, y: 150.0)];
        let b = line_string![(x: 50.0, y: 150.0), (x: 100.0, y: 200.0)];
        let c = line_string![(x: 50.0, y: 150.0), (x: 0.0, y: 250.0)];

        let net = propagate_classification(
            up.clone(),
            down.clone(),
            vec![b.clone(), c.clone(), a.clone()],
            &AnalysisConfig::default(),
        );
        assert_eq!(net.upstream.len(), 4);
        assert_eq!(net.downstream.len(), 1);
        assert_eq!(net.unclassified, 0);
        assert!(net.upstream.contains(&b));
        assert!(net.upstream.contains(&c));
    }

    #[test]
    fn test_touching_both_sides_stays_unclassified() {
        // A connector bridging both sub-paths never resolves
        let up = line_string![(x: 0.0, y: 10.0), (x: 0.0, y: 100.0)];
        let down = line_string![(x: 0.0, y: -10.0), (x: 0.0, y: -100.0)];
        let bridge = line_string![(x: 0.0, y: 50.0), (x: 0.0, y: -50.0)];

        let net =
            propagate_classification(up, down, vec![bridge], &AnalysisConfig::default());
        assert_eq!(net.unclassified, 1);
        assert_eq!(net.upstream.len(), 1);
        assert_eq!(net.downstream.len(), 1);
    }

    #[test]
    fn test_disconnected_line_terminates_after_max_passes() {
        let up = line_string![(x: 0.0, y: 10.0), (x: 0.0, y: 100.0)];
        let down = line_string![(x: 0.0, y: -10.0), (x: 0.0, y: -100.0)];
        let far = line_string![(x: 5000.0, y: 5000.0), (x: 6000.0, y: 6000.0)];

        let net = propagate_classification(up, down, vec![far], &AnalysisConfig::default());
        assert_eq!(net.unclassified, 1);
    }
}
