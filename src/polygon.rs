// src/polygon.rs

//! Turns each cell's edge collection into a closed polygon.
//!
//! Infinite parametric bounds are clamped to a fixed finite magnitude, so
//! unbounded hull cells come out as large finite polygons. That is an
//! approximation of the true cell and only holds while the working
//! coordinate extent stays well below the clamp. A ring that fails
//! validation or encloses no area is replaced by the convex hull of its
//! vertices; true power cells are convex, so the fallback recovers the cell
//! shape from unordered vertices, but for anything concave it silently
//! approximates. Both behaviors are deliberate and preserved from the
//! surveyed pipeline.

use crate::cells::VoronoiCellMap;
use crate::types::CellEdge;
use crate::utils::{comparison, constants};
use geo::{Area, ConvexHull, LineString, MultiPoint, Point, Polygon, Validation};
use tracing::warn;

/// Recoverable per-cell outcomes of the reconstruction pass, keyed by the
/// cell map's site index so a harness can count and inspect them.
#[derive(Debug, Clone, Default)]
pub struct ReconstructionReport {
    /// Cells with fewer than 3 usable vertices, or whose hull fallback was
    /// itself degenerate. These cells are omitted from the polygon list.
    pub degenerate_cells: Vec<usize>,
    /// Cells whose naive ring was invalid and got replaced by its hull.
    pub hull_fallbacks: Vec<usize>,
}

/// Reconstructs cell polygons from a [`VoronoiCellMap`].
#[derive(Debug, Clone)]
pub struct PolygonReconstructor {
    clamp: f64,
}

impl Default for PolygonReconstructor {
    fn default() -> Self {
        Self {
            clamp: constants::DEFAULT_CLAMP,
        }
    }
}

impl PolygonReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the finite magnitude substituted for infinite edge bounds.
    pub fn with_clamp(mut self, clamp: f64) -> Self {
        self.clamp = clamp.abs();
        self
    }

    /// Reconstructs every cell of the map, in key order.
    ///
    /// The returned polygon list carries no site association; re-attaching
    /// polygons to sites is the reconciler's job. The report records which
    /// cell keys were dropped or hull-approximated.
    pub fn reconstruct_all(
        &self,
        cell_map: &VoronoiCellMap,
    ) -> (Vec<Polygon<f64>>, ReconstructionReport) {
        let mut polygons = Vec::with_capacity(cell_map.len());
        let mut report = ReconstructionReport::default();

        for (&site, edges) in cell_map {
            match self.reconstruct_cell(edges) {
                Some((polygon, used_fallback)) => {
                    if used_fallback {
                        report.hull_fallbacks.push(site);
                    }
                    polygons.push(polygon);
                }
                None => {
                    warn!(site, "cell polygon is degenerate, omitting");
                    report.degenerate_cells.push(site);
                }
            }
        }
        (polygons, report)
    }

    /// Reconstructs a single cell. Returns the polygon and whether the
    /// convex-hull fallback was used, or `None` for a degenerate cell.
    pub fn reconstruct_cell(&self, edges: &[CellEdge]) -> Option<(Polygon<f64>, bool)> {
        let vertices = self.resolve_vertices(edges);
        if vertices.len() < 3 {
            return None;
        }

        let naive = Polygon::new(LineString::from(vertices.clone()), vec![]);
        // A collinear ring is valid geometry but encloses nothing, so the
        // validity check alone cannot reject it.
        if naive.is_valid() && !comparison::nearly_zero(naive.unsigned_area()) {
            return Some((naive, false));
        }
        convex_hull_of(&vertices).map(|hull| (hull, true))
    }

    /// Resolves each edge's endpoints, substituting the clamp for infinite
    /// parameter bounds, in edge order, skipping non-finite points and exact
    /// duplicates. Deduplication is by coordinate equality on purpose:
    /// near-duplicate vertices from touching edges pass through unmerged,
    /// matching the surveyed pipeline's behavior.
    fn resolve_vertices(&self, edges: &[CellEdge]) -> Vec<(f64, f64)> {
        let mut vertices: Vec<(f64, f64)> = Vec::with_capacity(edges.len() * 2);
        for edge in edges {
            let lower = if edge.tmin.is_finite() {
                edge.tmin
            } else {
                -self.clamp
            };
            let upper = if edge.tmax.is_finite() {
                edge.tmax
            } else {
                self.clamp
            };
            for t in [lower, upper] {
                let p = edge.point_at(t);
                if !p.x.is_finite() || !p.y.is_finite() {
                    continue;
                }
                let vertex = (p.x, p.y);
                if !vertices.contains(&vertex) {
                    vertices.push(vertex);
                }
            }
        }
        vertices
    }
}

/// Convex hull of a vertex set, or `None` when the hull collapses (fewer
/// than 3 distinct vertices or zero area). Hull computation is deterministic
/// and order-independent, so applying it twice yields the same polygon.
fn convex_hull_of(vertices: &[(f64, f64)]) -> Option<Polygon<f64>> {
    let points: MultiPoint<f64> = vertices.iter().map(|&(x, y)| Point::new(x, y)).collect();
    let hull = points.convex_hull();
    // A closed ring needs 4 coordinates for 3 distinct vertices.
    if hull.exterior().0.len() < 4 || comparison::nearly_zero(hull.unsigned_area()) {
        return None;
    }
    Some(hull)
}
