//! Planar geometry helpers
//!
//! Buffering, projection and distance primitives shared by the flow
//! classification stages. Circular arcs are approximated with straight
//! segments; buffers of lines are unions of per-segment capsules.

use castorgis_core::{GeoTransform, Raster};
use geo::{BooleanOps, Contains, Coord, Intersects, Line, LineString, MultiPolygon, Point, Polygon};
use std::f64::consts::PI;

/// Create a circular buffer polygon around a coordinate.
pub fn circle(center: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(4);
    let r = radius.abs();

    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((center.x + r * angle.cos(), center.y + r * angle.sin()));
    }
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

/// Buffer a single segment into a capsule: a rectangle with semicircular
/// end caps. Degenerates to a circle for a zero-length segment.
pub fn segment_capsule(a: Coord<f64>, b: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len < 1e-12 {
        return circle(a, radius, segments);
    }

    let r = radius.abs();
    let theta = dy.atan2(dx);
    let k = (segments / 2).max(4);

    // Counter-clockwise ring: semicircle behind `a`, then semicircle
    // ahead of `b`; the straight flanks fall out of ring adjacency.
    let mut coords = Vec::with_capacity(2 * k + 3);
    for i in 0..=k {
        let angle = theta + PI / 2.0 + PI * i as f64 / k as f64;
        coords.push((a.x + r * angle.cos(), a.y + r * angle.sin()));
    }
    for i in 0..=k {
        let angle = theta - PI / 2.0 + PI * i as f64 / k as f64;
        coords.push((b.x + r * angle.cos(), b.y + r * angle.sin()));
    }
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

/// Buffer a polyline by `radius`: the union of the capsules of its segments.
pub fn buffer_line(line: &LineString<f64>, radius: f64, segments: usize) -> MultiPolygon<f64> {
    buffer_lines(std::slice::from_ref(line), radius, segments)
}

/// Buffer a set of polylines into one dissolved multipolygon.
pub fn buffer_lines(lines: &[LineString<f64>], radius: f64, segments: usize) -> MultiPolygon<f64> {
    let mut acc: Option<MultiPolygon<f64>> = None;
    for line in lines {
        for seg in line.lines() {
            let capsule = MultiPolygon::new(vec![segment_capsule(
                seg.start, seg.end, radius, segments,
            )]);
            acc = Some(match acc {
                Some(mp) => mp.union(&capsule),
                None => capsule,
            });
        }
    }
    acc.unwrap_or_else(|| MultiPolygon::new(vec![]))
}

/// Project a point onto a segment, returning the closest point on the
/// segment and the distance to it.
pub fn project_onto_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> (Coord<f64>, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;

    let t = if len2 > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let q = Coord {
        x: a.x + t * dx,
        y: a.y + t * dy,
    };
    (q, (p.x - q.x).hypot(p.y - q.y))
}

/// Nearest point on a polyline
#[derive(Debug, Clone, Copy)]
pub struct NearestOnLine {
    /// Closest coordinate on the line
    pub coord: Coord<f64>,
    /// Index of the segment containing it (the first bracketing vertex)
    pub segment: usize,
    pub distance: f64,
}

/// Find the nearest point on a polyline to `p`. Distance ties between
/// segments keep the lower segment index.
pub fn nearest_on_line(line: &LineString<f64>, p: Coord<f64>) -> NearestOnLine {
    let mut best = NearestOnLine {
        coord: line.0[0],
        segment: 0,
        distance: f64::INFINITY,
    };

    for (i, seg) in line.lines().enumerate() {
        let (q, dist) = project_onto_segment(p, seg.start, seg.end);
        if dist < best.distance {
            best = NearestOnLine {
                coord: q,
                segment: i,
                distance: dist,
            };
        }
    }
    best
}

/// Distance from a point to a polyline
pub fn point_line_distance(p: Coord<f64>, line: &LineString<f64>) -> f64 {
    nearest_on_line(line, p).distance
}

/// Distance between two segments; zero when they cross.
fn segment_segment_distance(a: Line<f64>, b: Line<f64>) -> f64 {
    if a.intersects(&b) {
        return 0.0;
    }
    let d1 = project_onto_segment(a.start, b.start, b.end).1;
    let d2 = project_onto_segment(a.end, b.start, b.end).1;
    let d3 = project_onto_segment(b.start, a.start, a.end).1;
    let d4 = project_onto_segment(b.end, a.start, a.end).1;
    d1.min(d2).min(d3).min(d4)
}

/// Minimum distance between two polylines; zero when they intersect.
pub fn line_line_distance(l1: &LineString<f64>, l2: &LineString<f64>) -> f64 {
    let mut min = f64::INFINITY;
    for s1 in l1.lines() {
        for s2 in l2.lines() {
            let d = segment_segment_distance(s1, s2);
            if d < min {
                min = d;
            }
            if min == 0.0 {
                return 0.0;
            }
        }
    }
    min
}

/// Whether two polylines come within `margin` of each other
pub fn lines_within_margin(l1: &LineString<f64>, l2: &LineString<f64>, margin: f64) -> bool {
    line_line_distance(l1, l2) <= margin
}

/// Minimum distance between a multipolygon and a polyline; zero when the
/// line touches or enters the polygon.
pub fn multipolygon_line_distance(mp: &MultiPolygon<f64>, line: &LineString<f64>) -> f64 {
    if mp.intersects(line) {
        return 0.0;
    }

    let mut min = f64::INFINITY;
    for poly in &mp.0 {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors().iter()) {
            let d = line_line_distance(ring, line);
            if d < min {
                min = d;
            }
        }
    }
    min
}

/// Whether a multipolygon comes within `margin` of a polyline
pub fn polygon_within_margin(mp: &MultiPolygon<f64>, line: &LineString<f64>, margin: f64) -> bool {
    multipolygon_line_distance(mp, line) <= margin
}

/// Rasterize a multipolygon onto a grid: cells whose centers fall inside
/// the polygon are 1, all others 0 (also the nodata value).
pub fn rasterize(
    polys: &MultiPolygon<f64>,
    transform: GeoTransform,
    rows: usize,
    cols: usize,
) -> Raster<u8> {
    let mut out: Raster<u8> = Raster::new(rows, cols);
    out.set_transform(transform);
    out.set_nodata(Some(0));

    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = transform.pixel_to_geo(col, row);
            if polys.contains(&Point::new(x, y)) {
                unsafe { out.set_unchecked(row, col, 1) };
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;
    use geo::Area;

    #[test]
    fn test_circle_area() {
        let poly = circle(Coord { x: 0.0, y: 0.0 }, 10.0, 64);
        let expected = PI * 100.0;
        let error = (poly.unsigned_area() - expected).abs() / expected;
        assert!(error < 0.01, "circle area error {:.2}%", error * 100.0);
    }

    #[test]
    fn test_capsule_area() {
        // Capsule of a 10-unit segment with radius 2:
        // rectangle 10x4 plus a full circle of radius 2
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 10.0, y: 0.0 };
        let poly = segment_capsule(a, b, 2.0, 64);

        let expected = 10.0 * 4.0 + PI * 4.0;
        let error = (poly.unsigned_area() - expected).abs() / expected;
        assert!(error < 0.01, "capsule area error {:.2}%", error * 100.0);
    }

    #[test]
    fn test_capsule_degenerates_to_circle() {
        let a = Coord { x: 3.0, y: 4.0 };
        let poly = segment_capsule(a, a, 5.0, 32);
        let expected = PI * 25.0;
        let error = (poly.unsigned_area() - expected).abs() / expected;
        assert!(error < 0.01);
    }

    #[test]
    fn test_buffer_line_covers_vertices() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0)];
        let buffered = buffer_line(&line, 1.0, 16);
        assert!(buffered.contains(&Point::new(0.0, 0.0)));
        assert!(buffered.contains(&Point::new(10.0, 5.0)));
        assert!(!buffered.contains(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_project_onto_segment() {
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 10.0, y: 0.0 };

        let (q, d) = project_onto_segment(Coord { x: 5.0, y: 3.0 }, a, b);
        assert_eq!(q, Coord { x: 5.0, y: 0.0 });
        assert!((d - 3.0).abs() < 1e-12);

        // Beyond the end: clamps to the endpoint
        let (q, d) = project_onto_segment(Coord { x: 14.0, y: 3.0 }, a, b);
        assert_eq!(q, b);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_on_line_picks_segment() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 20.0, y: 10.0)];
        let near = nearest_on_line(&line, Coord { x: 3.0, y: 1.0 });
        assert_eq!(near.segment, 0);
        assert_eq!(near.coord, Coord { x: 3.0, y: 0.0 });
        assert!((near.distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_line_line_distance() {
        let l1 = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        let l2 = line_string![(x: 0.0, y: 3.0), (x: 10.0, y: 3.0)];
        assert!((line_line_distance(&l1, &l2) - 3.0).abs() < 1e-12);

        let crossing = line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 1.0)];
        assert_eq!(line_line_distance(&l1, &crossing), 0.0);
    }

    #[test]
    fn test_rasterize_counts() {
        // 4x4 unit grid over [0,4]x[0,4], square polygon covering [0,2]x[2,4]
        let polys = MultiPolygon::new(vec![
            geo::Rect::new((0.0, 2.0), (2.0, 4.0)).to_polygon(),
        ]);
        let mask = rasterize(&polys, GeoTransform::new(0.0, 4.0, 1.0), 4, 4);
        assert_eq!(mask.count_ones(), 4);
        assert_eq!(mask.get(0, 0).unwrap(), 1);
        assert_eq!(mask.get(3, 3).unwrap(), 0);
    }
}
