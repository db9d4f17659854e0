// src/reconcile.rs

//! Assigns every site back to one reconstructed cell polygon.
//!
//! Polygons arrive as a plain list with no site association; each site scans
//! the list in order and the first polygon containing its point (boundary
//! included) wins. Later matches are recorded as containment conflicts but
//! never override the first assignment; the first-wins rule is preserved
//! as-is from the surveyed pipeline even though it encodes no geometric
//! preference. The scan is read-only over shared data and every site owns a
//! disjoint output slot, so the sites are processed in parallel without
//! synchronization.

use crate::types::Site;
use geo::{Intersects, Point, Polygon};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// A site found inside more than one reconstructed polygon. Recoverable:
/// the first match is kept, the extra match is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainmentConflict {
    /// Index of the multiply-contained site.
    pub site: usize,
    /// Polygon index of the retained (first) assignment.
    pub kept: usize,
    /// Polygon index of the additional containing polygon.
    pub rejected: usize,
}

/// Outcome of the reconciliation pass.
///
/// `assignments` is index-aligned with the input sites and always has the
/// same length: unassigned sites keep `None` instead of being dropped, so
/// downstream row counts stay stable.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Per-site polygon index into the reconciler's polygon list.
    pub assignments: Vec<Option<usize>>,
    pub conflicts: Vec<ContainmentConflict>,
}

impl Reconciliation {
    /// Indices of sites contained by no polygon.
    pub fn unassigned(&self) -> impl Iterator<Item = usize> + '_ {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_none())
            .map(|(i, _)| i)
    }

    pub fn unassigned_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_none()).count()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

/// Runs the containment scan for every site against the polygon list.
pub fn reconcile(sites: &[Site], polygons: &[Polygon<f64>]) -> Reconciliation {
    let per_site: Vec<(Option<usize>, Vec<ContainmentConflict>)> = sites
        .par_iter()
        .enumerate()
        .map(|(site, s)| {
            let point = Point::new(s.position.x, s.position.y);
            let mut assigned = None;
            let mut conflicts = Vec::new();
            for (index, polygon) in polygons.iter().enumerate() {
                if polygon.intersects(&point) {
                    match assigned {
                        None => assigned = Some(index),
                        Some(kept) => conflicts.push(ContainmentConflict {
                            site,
                            kept,
                            rejected: index,
                        }),
                    }
                }
            }
            (assigned, conflicts)
        })
        .collect();

    let mut result = Reconciliation {
        assignments: Vec::with_capacity(sites.len()),
        conflicts: Vec::new(),
    };
    for (assignment, mut conflicts) in per_site {
        result.assignments.push(assignment);
        result.conflicts.append(&mut conflicts);
    }

    if !result.conflicts.is_empty() {
        warn!(
            conflicts = result.conflicts.len(),
            "sites contained by more than one cell polygon"
        );
    }
    debug!(
        sites = sites.len(),
        unassigned = result.unassigned_count(),
        "reconciliation complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use nalgebra::Point2;

    fn site(x: f64, y: f64) -> Site {
        Site::new(Point2::new(x, y), 0.0)
    }

    fn unit_square(x0: f64, y0: f64, side: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
        ]
    }

    #[test]
    fn disjoint_polygons_assign_without_conflicts() {
        let sites = vec![site(0.5, 0.5), site(5.5, 0.5)];
        let polygons = vec![unit_square(0.0, 0.0, 1.0), unit_square(5.0, 0.0, 1.0)];

        let result = reconcile(&sites, &polygons);
        assert_eq!(result.assignments, vec![Some(0), Some(1)]);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.unassigned_count(), 0);
    }

    #[test]
    fn first_containing_polygon_wins_and_conflict_is_reported() {
        // Two overlapping squares both contain the site.
        let sites = vec![site(1.0, 1.0)];
        let polygons = vec![unit_square(0.0, 0.0, 2.0), unit_square(0.5, 0.5, 2.0)];

        let result = reconcile(&sites, &polygons);
        assert_eq!(result.assignments, vec![Some(0)]);
        assert_eq!(
            result.conflicts,
            vec![ContainmentConflict {
                site: 0,
                kept: 0,
                rejected: 1,
            }]
        );
    }

    #[test]
    fn uncontained_sites_stay_none_and_rows_are_stable() {
        let sites = vec![site(0.5, 0.5), site(10.0, 10.0), site(0.2, 0.8)];
        let polygons = vec![unit_square(0.0, 0.0, 1.0)];

        let result = reconcile(&sites, &polygons);
        assert_eq!(result.assignments.len(), sites.len());
        assert_eq!(result.assignments[1], None);
        assert_eq!(result.unassigned().collect::<Vec<_>>(), vec![1]);
        // No polygon contains the unassigned site's point.
        let point = Point::new(10.0, 10.0);
        assert!(polygons.iter().all(|p| !p.intersects(&point)));
    }

    #[test]
    fn empty_polygon_list_leaves_every_site_unassigned() {
        let sites = vec![site(0.0, 0.0), site(1.0, 1.0)];
        let result = reconcile(&sites, &[]);
        assert_eq!(result.assignments, vec![None, None]);
        assert_eq!(result.unassigned_count(), 2);
    }

    #[test]
    fn boundary_points_count_as_contained() {
        let sites = vec![site(0.0, 0.5)];
        let polygons = vec![unit_square(0.0, 0.0, 1.0)];

        let result = reconcile(&sites, &polygons);
        assert_eq!(result.assignments, vec![Some(0)]);
    }
}
