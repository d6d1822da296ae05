//! Upstream/downstream vertex partition
//!
//! Slices the main flowline's vertex sequence at the vertex nearest the
//! split point into an upstream and a downstream sub-path, borrowing a
//! neighboring vertex when a sub-path would be degenerate, and trimming
//! the duplicated shared vertex from the longer side.

use crate::error::{AnalysisError, Result};
use geo::{Coord, LineString};

/// The partitioned vertex sub-paths of a flowline
#[derive(Debug, Clone)]
pub struct VertexPartition {
    /// Vertices from the line start up to the split vertex
    pub upstream: Vec<Coord<f64>>,
    /// Vertices from the split vertex to the line end
    pub downstream: Vec<Coord<f64>>,
    /// The split vertex both sub-paths originally shared
    pub shared: Coord<f64>,
}

impl VertexPartition {
    /// Convert the sub-paths into line geometries. Fails when a sub-path
    /// still has fewer than 2 coordinates after the fallback.
    pub fn to_lines(&self) -> Result<(LineString<f64>, LineString<f64>)> {
        if self.upstream.len() < 2 || self.downstream.len() < 2 {
            return Err(AnalysisError::InsufficientVertices);
        }
        Ok((
            LineString::from(self.upstream.clone()),
            LineString::from(self.downstream.clone()),
        ))
    }
}

/// Index of the vertex on `line` closest to `target`. Ties keep the
/// lowest index.
pub fn closest_vertex_index(line: &LineString<f64>, target: Coord<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in line.0.iter().enumerate() {
        let d = (c.x - target.x).hypot(c.y - target.y);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Partition an ordered vertex list at `closest`.
///
/// The upstream sub-path takes vertices `[0..=closest]`, the downstream
/// sub-path `[closest..]`. A sub-path left with fewer than 2 vertices
/// borrows one neighbor from the full list (the next vertex for upstream,
/// the previous for downstream, clamped to valid indices). The shared
/// split vertex is then removed from the longer side, so in the
/// non-degenerate case the sub-paths are coordinate-disjoint and their
/// concatenation reproduces the original list.
pub fn partition_vertices(coords: &[Coord<f64>], closest: usize) -> Result<VertexPartition> {
    if coords.len() < 2 || closest >= coords.len() {
        return Err(AnalysisError::InsufficientVertices);
    }

    let mut upstream: Vec<Coord<f64>> = coords[..=closest].to_vec();
    let mut downstream: Vec<Coord<f64>> = coords[closest..].to_vec();

    if upstream.len() < 2 {
        let borrow = (closest + 1).min(coords.len() - 1);
        upstream.push(coords[borrow]);
    }
    if downstream.len() < 2 {
        let borrow = closest.saturating_sub(1);
        downstream.push(coords[borrow]);
    }

    let shared = coords[closest];
    if upstream.len() > downstream.len() {
        upstream.pop();
    } else {
        downstream.remove(0);
    }

    Ok(VertexPartition {
        upstream,
        downstream,
        shared,
    })
}
