// src/triangulation.rs

//! Power triangulation (regular triangulation) of weighted sites.
//!
//! The triangulation is dual to the Laguerre/power Voronoi diagram: three
//! sites form a triangle exactly when their common power-equidistant point
//! (the power circumcenter) is closer, in power distance, to them than to
//! every other site. Lifting each site onto the paraboloid
//! `z = x^2 + y^2 - w^2` turns this into an ordinary lower-convex-hull
//! problem, so the classic incremental Bowyer-Watson insertion works once its
//! in-circle predicate is swapped for the lifted orientation determinant.

use crate::error::{VoronoiError, VoronoiResult};
use crate::types::Site;
use crate::utils::constants;
use nalgebra::{Matrix2, Matrix3, Point2, Vector2};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of the power triangulation.
#[derive(Debug, Clone)]
pub struct PowerTriangulation {
    /// Counter-clockwise triangles over site indices, rotated so the lowest
    /// index comes first and sorted for deterministic downstream iteration.
    pub triangles: Vec<[usize; 3]>,
    /// Power circumcenter of each triangle, index-aligned with `triangles`.
    pub vertices: Vec<Point2<f64>>,
    /// Sites whose weighted cell is empty (power-redundant). They appear in
    /// no triangle and will have no cell in the diagram.
    pub hidden: Vec<usize>,
}

/// Incremental Bowyer-Watson triangulator with the power in-circle predicate.
///
/// The conflict scan is a full pass over the current triangle set per
/// insertion; quadratic overall, which keeps the cavity search free of
/// spatial-index bookkeeping. Near-zero predicate determinants (within
/// `epsilon`) count as "no conflict", so cocircular ties keep the diagonal
/// of whichever triangle was built first; with a fixed insertion order this
/// makes the output deterministic.
#[derive(Debug, Clone)]
pub struct PowerTriangulator {
    epsilon: f64,
}

impl Default for PowerTriangulator {
    fn default() -> Self {
        Self {
            epsilon: constants::EPSILON,
        }
    }
}

impl PowerTriangulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance used by the orientation and conflict predicates.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.max(0.0);
        self
    }

    /// Triangulates the given weighted sites.
    ///
    /// Requires at least 3 sites, non-negative weights and no coincident
    /// pair. Collinear input yields no triangle and is surfaced as
    /// [`VoronoiError::CollinearSites`].
    pub fn triangulate(&self, sites: &[Site]) -> VoronoiResult<PowerTriangulation> {
        self.validate(sites)?;
        let n = sites.len();

        // Working point set: the real sites followed by three zero-weight
        // super-triangle vertices that enclose everything.
        let mut points: Vec<Point2<f64>> = sites.iter().map(|s| s.position).collect();
        let mut lifted: Vec<f64> = sites.iter().map(Site::lifted).collect();
        for p in super_triangle(&points) {
            lifted.push(p.x * p.x + p.y * p.y);
            points.push(p);
        }

        let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];
        let mut hidden = Vec::new();

        for d in 0..n {
            let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
                .into_iter()
                .partition(|t| self.in_conflict(&points, &lifted, *t, d));

            if bad.is_empty() {
                // Power-redundant site: its lifted point lies above every
                // facet of the lower hull, so it owns no cell.
                debug!(site = d, "site is hidden in the power diagram");
                hidden.push(d);
                triangles = good;
                continue;
            }

            // Cavity boundary: edges of conflicting triangles not shared by
            // two of them, kept in their CCW direction so the fan around the
            // new site stays CCW.
            let mut boundary: BTreeMap<(usize, usize), (usize, usize)> = BTreeMap::new();
            for t in &bad {
                for (u, v) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                    let key = if u < v { (u, v) } else { (v, u) };
                    if boundary.remove(&key).is_none() {
                        boundary.insert(key, (u, v));
                    }
                }
            }

            triangles = good;
            for (u, v) in boundary.into_values() {
                let tri = if orient2d(&points[u], &points[v], &points[d]) >= 0.0 {
                    [u, v, d]
                } else {
                    [v, u, d]
                };
                triangles.push(tri);
            }
        }

        // Strip everything that still touches a super-triangle vertex.
        let mut triangles: Vec<[usize; 3]> = triangles
            .into_iter()
            .filter(|t| t.iter().all(|&i| i < n))
            .map(canonical_rotation)
            .collect();
        if triangles.is_empty() {
            return Err(VoronoiError::CollinearSites);
        }
        triangles.sort_unstable();

        let vertices = triangles
            .iter()
            .map(|&t| power_circumcenter(sites, t))
            .collect::<VoronoiResult<Vec<_>>>()?;

        debug!(
            sites = n,
            triangles = triangles.len(),
            hidden = hidden.len(),
            "power triangulation complete"
        );
        Ok(PowerTriangulation {
            triangles,
            vertices,
            hidden,
        })
    }

    fn validate(&self, sites: &[Site]) -> VoronoiResult<()> {
        if sites.len() < 3 {
            return Err(VoronoiError::InsufficientSites {
                expected: 3,
                actual: sites.len(),
            });
        }
        for (i, site) in sites.iter().enumerate() {
            if site.weight < 0.0 {
                return Err(VoronoiError::NegativeWeight {
                    index: i,
                    weight: site.weight,
                });
            }
            for (j, other) in sites.iter().enumerate().take(i) {
                if (site.position - other.position).norm_squared() < self.epsilon * self.epsilon {
                    return Err(VoronoiError::CoincidentSites {
                        first: j,
                        second: i,
                    });
                }
            }
        }
        Ok(())
    }

    /// Power in-circle test: for a CCW triangle, site `d` conflicts when its
    /// lifted point lies below the plane spanned by the triangle's lifted
    /// sites. Ties (|det| <= epsilon) are not conflicts.
    fn in_conflict(
        &self,
        points: &[Point2<f64>],
        lifted: &[f64],
        tri: [usize; 3],
        d: usize,
    ) -> bool {
        let [a, b, c] = tri;
        let det = Matrix3::new(
            points[a].x - points[d].x,
            points[a].y - points[d].y,
            lifted[a] - lifted[d],
            points[b].x - points[d].x,
            points[b].y - points[d].y,
            lifted[b] - lifted[d],
            points[c].x - points[d].x,
            points[c].y - points[d].y,
            lifted[c] - lifted[d],
        )
        .determinant();
        det > self.epsilon
    }
}

/// Signed doubled area of (a, b, c); positive for a counter-clockwise turn.
fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Rotates a triangle so its lowest site index comes first, preserving
/// orientation.
fn canonical_rotation(t: [usize; 3]) -> [usize; 3] {
    if t[0] < t[1] && t[0] < t[2] {
        t
    } else if t[1] < t[2] {
        [t[1], t[2], t[0]]
    } else {
        [t[2], t[0], t[1]]
    }
}

/// Three CCW vertices of an equilateral-ish triangle enclosing all points,
/// scaled far enough out that every real circumcenter stays inside but close
/// enough that the lifted determinants keep their f64 precision.
fn super_triangle(points: &[Point2<f64>]) -> [Point2<f64>; 3] {
    let mut min = points[0];
    let mut max = points[0];
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let center = Point2::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5);
    let extent = (max.x - min.x).max(max.y - min.y).max(1.0);
    let radius = extent * constants::SUPER_TRIANGLE_SCALE;

    let mut corners = [center; 3];
    for (k, corner) in corners.iter_mut().enumerate() {
        let angle = std::f64::consts::FRAC_PI_2 + k as f64 * std::f64::consts::TAU / 3.0;
        *corner = center + Vector2::new(angle.cos(), angle.sin()) * radius;
    }
    corners
}

/// The point with equal power distance to the triangle's three sites,
/// obtained from the 2x2 linear system `2 P . (b - a) = z_b - z_a`,
/// `2 P . (c - a) = z_c - z_a` on the lifted heights.
fn power_circumcenter(sites: &[Site], tri: [usize; 3]) -> VoronoiResult<Point2<f64>> {
    let [a, b, c] = tri;
    let (pa, pb, pc) = (sites[a].position, sites[b].position, sites[c].position);
    let m = Matrix2::new(
        2.0 * (pb.x - pa.x),
        2.0 * (pb.y - pa.y),
        2.0 * (pc.x - pa.x),
        2.0 * (pc.y - pa.y),
    );
    let rhs = Vector2::new(
        sites[b].lifted() - sites[a].lifted(),
        sites[c].lifted() - sites[a].lifted(),
    );
    m.lu()
        .solve(&rhs)
        .map(|v| Point2::new(v.x, v.y))
        .ok_or_else(|| VoronoiError::GeometricFailure {
            operation: format!("power circumcenter of collinear triangle {tri:?}"),
        })
}
