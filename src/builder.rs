// src/builder.rs

//! Pipeline facade: sites -> power triangulation -> cell map -> polygons ->
//! per-site assignment, with every intermediate product kept for inspection.
//! The export collaborator consumes the result; nothing here touches disk.

use crate::cells::{VoronoiCellMap, build_voronoi_cells};
use crate::error::VoronoiResult;
use crate::polygon::{PolygonReconstructor, ReconstructionReport};
use crate::reconcile::{Reconciliation, reconcile};
use crate::triangulation::{PowerTriangulation, PowerTriangulator};
use crate::types::{Site, SiteClass, WeightProfile};
use crate::utils::constants;
use geo::{Area, Polygon};
use nalgebra::Point2;
use tracing::info;

/// Configures and runs the full weighted Voronoi pipeline.
#[derive(Debug, Clone)]
pub struct WeightedVoronoiBuilder {
    weights: WeightProfile,
    clamp: f64,
    epsilon: f64,
}

impl Default for WeightedVoronoiBuilder {
    fn default() -> Self {
        Self {
            weights: WeightProfile::default(),
            clamp: constants::DEFAULT_CLAMP,
            epsilon: constants::EPSILON,
        }
    }
}

impl WeightedVoronoiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the class-to-weight mapping used by [`Self::build_classified`].
    pub fn with_weights(mut self, weights: WeightProfile) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the finite magnitude substituted for infinite edge bounds.
    pub fn with_clamp(mut self, clamp: f64) -> Self {
        self.clamp = clamp.abs();
        self
    }

    /// Sets the predicate tolerance of the triangulation stage.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.max(0.0);
        self
    }

    /// Builds the diagram from located, urban/rural-classified records,
    /// deriving each site's weight from the configured profile. Record
    /// order defines site identity.
    pub fn build_classified(
        &self,
        records: &[(Point2<f64>, SiteClass)],
    ) -> VoronoiResult<WeightedVoronoi> {
        let sites = records
            .iter()
            .map(|&(position, class)| Site::new(position, self.weights.weight_for(class)))
            .collect();
        self.build(sites)
    }

    /// Builds the diagram from pre-weighted sites.
    pub fn build(&self, sites: Vec<Site>) -> VoronoiResult<WeightedVoronoi> {
        let triangulation = PowerTriangulator::new()
            .with_epsilon(self.epsilon)
            .triangulate(&sites)?;
        info!(
            sites = sites.len(),
            triangles = triangulation.triangles.len(),
            "power triangulation built"
        );

        let cell_map = build_voronoi_cells(&sites, &triangulation)?;
        let (polygons, reconstruction) = PolygonReconstructor::new()
            .with_clamp(self.clamp)
            .reconstruct_all(&cell_map);
        info!(
            cells = cell_map.len(),
            polygons = polygons.len(),
            degenerate = reconstruction.degenerate_cells.len(),
            "cell polygons reconstructed"
        );

        let reconciliation = reconcile(&sites, &polygons);
        Ok(WeightedVoronoi {
            sites,
            triangulation,
            cell_map,
            polygons,
            reconstruction,
            reconciliation,
        })
    }
}

/// The fully reconciled weighted Voronoi diagram.
#[derive(Debug, Clone)]
pub struct WeightedVoronoi {
    pub sites: Vec<Site>,
    pub triangulation: PowerTriangulation,
    pub cell_map: VoronoiCellMap,
    /// Reconstructed cell polygons, in cell map key order.
    pub polygons: Vec<Polygon<f64>>,
    pub reconstruction: ReconstructionReport,
    pub reconciliation: Reconciliation,
}

impl WeightedVoronoi {
    /// The polygon assigned to a site, if any.
    pub fn polygon_for(&self, site: usize) -> Option<&Polygon<f64>> {
        self.reconciliation
            .assignments
            .get(site)
            .copied()
            .flatten()
            .and_then(|index| self.polygons.get(index))
    }

    pub fn statistics(&self) -> DiagramStatistics {
        let mean_cell_area = if self.polygons.is_empty() {
            0.0
        } else {
            self.polygons.iter().map(Area::unsigned_area).sum::<f64>() / self.polygons.len() as f64
        };
        DiagramStatistics {
            site_count: self.sites.len(),
            triangle_count: self.triangulation.triangles.len(),
            cell_count: self.cell_map.len(),
            polygon_count: self.polygons.len(),
            hidden_site_count: self.triangulation.hidden.len(),
            degenerate_cell_count: self.reconstruction.degenerate_cells.len(),
            hull_fallback_count: self.reconstruction.hull_fallbacks.len(),
            conflict_count: self.reconciliation.conflict_count(),
            unassigned_count: self.reconciliation.unassigned_count(),
            mean_cell_area,
        }
    }
}

/// Aggregate counters over the finished diagram, one per observable outcome
/// of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramStatistics {
    pub site_count: usize,
    pub triangle_count: usize,
    pub cell_count: usize,
    pub polygon_count: usize,
    pub hidden_site_count: usize,
    pub degenerate_cell_count: usize,
    pub hull_fallback_count: usize,
    pub conflict_count: usize,
    pub unassigned_count: usize,
    pub mean_cell_area: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Intersects, Point};

    fn classified(coords: &[(f64, f64)], class: SiteClass) -> Vec<(Point2<f64>, SiteClass)> {
        coords
            .iter()
            .map(|&(x, y)| (Point2::new(x, y), class))
            .collect()
    }

    #[test]
    fn equal_weight_square_assigns_every_corner_its_own_cell() {
        let sites = vec![
            Site::new(Point2::new(0.0, 0.0), 1.0),
            Site::new(Point2::new(10.0, 0.0), 1.0),
            Site::new(Point2::new(0.0, 10.0), 1.0),
            Site::new(Point2::new(10.0, 10.0), 1.0),
        ];
        let diagram = WeightedVoronoiBuilder::new()
            .with_clamp(100.0)
            .build(sites)
            .unwrap();

        assert_eq!(diagram.triangulation.triangles.len(), 2);
        assert_eq!(diagram.cell_map.len(), 4);
        assert_eq!(diagram.polygons.len(), 4);

        let assignments = &diagram.reconciliation.assignments;
        assert_eq!(assignments.len(), 4);
        assert!(assignments.iter().all(Option::is_some));
        // Four distinct quadrant polygons, one per corner site.
        let mut indices: Vec<usize> = assignments.iter().map(|a| a.unwrap()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 4);

        assert_eq!(diagram.reconciliation.conflict_count(), 0);
        assert_eq!(diagram.reconciliation.unassigned_count(), 0);

        // Every assignment actually contains its site.
        for (site, polygon_index) in assignments.iter().enumerate() {
            let p = diagram.sites[site].position;
            let polygon = &diagram.polygons[polygon_index.unwrap()];
            assert!(polygon.intersects(&Point::new(p.x, p.y)));
        }
    }

    #[test]
    fn rural_cell_is_larger_than_urban_cell() {
        // An urban and a rural site 0.05 degrees apart, ringed by padding
        // sites so both central cells are bounded. The power boundary is
        // pulled toward the smaller-weight urban site.
        let profile = WeightProfile::default();
        let mut records = vec![
            (Point2::new(0.0, 0.0), SiteClass::Urban),
            (Point2::new(0.05, 0.0), SiteClass::Rural),
        ];
        for k in 0..6 {
            let angle = k as f64 * std::f64::consts::TAU / 6.0;
            records.push((
                Point2::new(0.025 + 0.15 * angle.cos(), 0.15 * angle.sin()),
                SiteClass::Urban,
            ));
        }

        let diagram = WeightedVoronoiBuilder::new()
            .with_weights(profile)
            .build_classified(&records)
            .unwrap();

        let urban = diagram.polygon_for(0).expect("urban cell missing");
        let rural = diagram.polygon_for(1).expect("rural cell missing");
        assert!(
            rural.unsigned_area() > urban.unsigned_area(),
            "rural cell ({}) should exceed urban cell ({})",
            rural.unsigned_area(),
            urban.unsigned_area()
        );
    }

    #[test]
    fn classified_sites_are_contained_by_their_assigned_cells() {
        // Same urban/rural layout as above. The urban cell's interior edges
        // all meet at nearby circumcenters; its ring must still come out as
        // the actual cell and contain the urban site.
        let mut records = vec![
            (Point2::new(0.0, 0.0), SiteClass::Urban),
            (Point2::new(0.05, 0.0), SiteClass::Rural),
        ];
        for k in 0..6 {
            let angle = k as f64 * std::f64::consts::TAU / 6.0;
            records.push((
                Point2::new(0.025 + 0.15 * angle.cos(), 0.15 * angle.sin()),
                SiteClass::Urban,
            ));
        }

        let diagram = WeightedVoronoiBuilder::new()
            .build_classified(&records)
            .unwrap();

        assert_eq!(diagram.reconciliation.unassigned_count(), 0);
        for (site, (position, _)) in records.iter().enumerate() {
            let polygon = diagram.polygon_for(site).expect("site has no polygon");
            assert!(
                polygon.intersects(&Point::new(position.x, position.y)),
                "assigned polygon does not contain site {site}"
            );
        }
    }

    #[test]
    fn row_count_is_stable_even_with_hidden_sites() {
        // The zero-weight center site is dominated by the heavy corners and
        // owns no cell, but it still occupies its assignment slot.
        let mut sites = vec![
            Site::new(Point2::new(0.0, 0.0), 1.0),
            Site::new(Point2::new(1.0, 0.0), 1.0),
            Site::new(Point2::new(0.5, 1.0), 1.0),
        ];
        sites.push(Site::new(Point2::new(0.5, 0.35), 0.0));

        let diagram = WeightedVoronoiBuilder::new().build(sites).unwrap();
        assert_eq!(diagram.triangulation.hidden, vec![3]);
        assert!(!diagram.cell_map.contains_key(&3));
        assert_eq!(diagram.reconciliation.assignments.len(), 4);
    }

    #[test]
    fn statistics_reflect_pipeline_counters() {
        let records = classified(
            &[(0.0, 0.0), (1.0, 0.1), (0.4, 0.9), (1.2, 1.1)],
            SiteClass::Rural,
        );
        let diagram = WeightedVoronoiBuilder::new()
            .build_classified(&records)
            .unwrap();
        let stats = diagram.statistics();

        assert_eq!(stats.site_count, 4);
        assert_eq!(stats.cell_count, diagram.cell_map.len());
        assert_eq!(stats.polygon_count, diagram.polygons.len());
        assert_eq!(stats.unassigned_count, diagram.reconciliation.unassigned_count());
        assert!(stats.mean_cell_area > 0.0);
    }
}
