// src/cells.rs

//! Derives the bounding edges of every weighted Voronoi cell from the power
//! triangulation.
//!
//! Each pair of sites that shares a triangulation edge contributes one cell
//! edge. When two triangles share the pair, the edge is the finite segment
//! between their power circumcenters, parameterized over `[0, 1]`; when only
//! one does (a hull pair), the edge is a half-infinite unit-direction ray.
//! Sign convention: `tmin = 0` always, rays run from the existing triangle's
//! circumcenter along the outward perpendicular of the site-pair line with
//! `tmax = +inf`. Within each cell the edges are sorted by the outward
//! direction of their neighbor site, which for a convex cell walks the
//! boundary in a single turn.

use crate::error::{VoronoiError, VoronoiResult};
use crate::triangulation::PowerTriangulation;
use crate::types::{CellEdge, Site};
use nalgebra::{Point2, Vector2};
use std::collections::BTreeMap;

/// Site index to the ordered collection of its bounding edges. Every site
/// that appears in at least one triangle has a key; hidden sites have none.
pub type VoronoiCellMap = BTreeMap<usize, Vec<CellEdge>>;

/// Builds the cell map of a power triangulation.
///
/// Each edge is attributed to both of its sites, so a finite bisector shows
/// up in exactly two cells. A site pair shared by more than two triangles
/// means the triangulation is non-manifold and is surfaced as an error.
pub fn build_voronoi_cells(
    sites: &[Site],
    triangulation: &PowerTriangulation,
) -> VoronoiResult<VoronoiCellMap> {
    let mut pair_triangles: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for (t, tri) in triangulation.triangles.iter().enumerate() {
        for (u, v) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let key = if u < v { (u, v) } else { (v, u) };
            pair_triangles.entry(key).or_default().push(t);
        }
    }

    let mut cell_map = VoronoiCellMap::new();
    for (&(i, j), adjacent) in &pair_triangles {
        let edge = match adjacent.as_slice() {
            [t0, t1] => finite_edge((i, j), triangulation.vertices[*t0], triangulation.vertices[*t1]),
            [t0] => hull_ray(sites, (i, j), triangulation, *t0),
            _ => {
                return Err(VoronoiError::NonManifoldEdge {
                    first: i,
                    second: j,
                    count: adjacent.len(),
                });
            }
        };
        cell_map.entry(i).or_default().push(edge.clone());
        cell_map.entry(j).or_default().push(edge);
    }

    // Cyclic order around each site. The naive ring a cell's edge list
    // resolves to is only the cell boundary when consecutive edges share a
    // circumcenter, so the pair-sorted encounter order is not good enough.
    for (&site, edges) in cell_map.iter_mut() {
        edges.sort_by(|a, b| {
            outward_angle(sites, site, a).total_cmp(&outward_angle(sites, site, b))
        });
    }
    Ok(cell_map)
}

/// Angle of the neighbor site as seen from the cell's own site. Cell edges
/// are perpendicular to this direction, so sorting by it orders the edges of
/// a convex cell along its boundary.
fn outward_angle(sites: &[Site], site: usize, edge: &CellEdge) -> f64 {
    let neighbor = edge.sites.0 + edge.sites.1 - site;
    let d = sites[neighbor].position - sites[site].position;
    d.y.atan2(d.x)
}

/// Finite bisector segment between the circumcenters of two adjacent
/// triangles, parameterized over `[0, 1]` with the raw span as direction.
/// Endpoint resolution then skips the normalize-and-rescale round-trip, so
/// a circumcenter shared with a neighboring edge resolves to the same
/// coordinates and the polygon stage's exact dedup can merge it. Cocircular
/// ties can collapse the two circumcenters onto one point; the edge then
/// degenerates but is kept so both cells still record the adjacency.
fn finite_edge(pair: (usize, usize), v0: Point2<f64>, v1: Point2<f64>) -> CellEdge {
    CellEdge::new(pair, v0, v1 - v0, 0.0, 1.0)
}

/// Half-infinite bisector ray for a hull pair: starts at the only adjacent
/// triangle's circumcenter, runs perpendicular to the site-pair line, and
/// points away from that triangle's third site.
fn hull_ray(
    sites: &[Site],
    (i, j): (usize, usize),
    triangulation: &PowerTriangulation,
    t: usize,
) -> CellEdge {
    let tri = triangulation.triangles[t];
    // The adjacent triangle consists of the pair plus exactly one more site.
    let third = tri[0] + tri[1] + tri[2] - i - j;

    let pi = sites[i].position;
    let pj = sites[j].position;
    let span = pj - pi;
    let mut direction = Vector2::new(-span.y, span.x).normalize();
    let midpoint = nalgebra::center(&pi, &pj);
    if direction.dot(&(midpoint - sites[third].position)) < 0.0 {
        direction = -direction;
    }

    CellEdge::new(
        (i, j),
        triangulation.vertices[t],
        direction,
        0.0,
        f64::INFINITY,
    )
}
