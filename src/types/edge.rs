// src/types/edge.rs

use nalgebra::{Point2, Vector2};

/// One bounding edge of a Voronoi cell, in parametric form.
///
/// The edge is the set of points `origin + t * direction` for
/// `t in [tmin, tmax]`. The cell builder fixes a single sign convention:
/// `tmin` is always 0; finite segments span the two circumcenters with
/// `direction = v1 - v0` and `tmax = 1`, so their endpoints resolve without
/// a normalization round-trip; half-infinite rays carry a unit `direction`
/// pointing away from the triangulation and `tmax = f64::INFINITY`. The
/// same edge instance bounds both cells of its site pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdge {
    /// The two site indices whose cells this edge separates, low index first.
    pub sites: (usize, usize),
    pub origin: Point2<f64>,
    pub direction: Vector2<f64>,
    pub tmin: f64,
    pub tmax: f64,
}

impl CellEdge {
    pub fn new(
        sites: (usize, usize),
        origin: Point2<f64>,
        direction: Vector2<f64>,
        tmin: f64,
        tmax: f64,
    ) -> Self {
        let sites = if sites.0 <= sites.1 {
            sites
        } else {
            (sites.1, sites.0)
        };
        Self {
            sites,
            origin,
            direction,
            tmin,
            tmax,
        }
    }

    /// Whether either parametric bound is infinite.
    pub fn is_ray(&self) -> bool {
        self.tmin.is_infinite() || self.tmax.is_infinite()
    }

    /// Point on the edge at parameter `t`.
    pub fn point_at(&self, t: f64) -> Point2<f64> {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn site_pair_is_canonicalized() {
        let edge = CellEdge::new(
            (7, 2),
            Point2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            0.0,
            1.0,
        );
        assert_eq!(edge.sites, (2, 7));
    }

    #[test]
    fn point_at_walks_along_direction() {
        let edge = CellEdge::new(
            (0, 1),
            Point2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
            0.0,
            f64::INFINITY,
        );
        assert!(edge.is_ray());
        let p = edge.point_at(2.5);
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 3.5);
    }
}
