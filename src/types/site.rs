// src/types/site.rs

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Urban/rural classification of a survey record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteClass {
    Urban,
    Rural,
}

/// Maps a [`SiteClass`] to the radius-like weight used by the power diagram.
///
/// The defaults are degree-equivalent radii (1° latitude ≈ 111 km): roughly
/// 2 km around urban clusters and 5 km around rural ones, matching the
/// displacement radii of the survey methodology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub urban: f64,
    pub rural: f64,
}

impl Default for WeightProfile {
    fn default() -> Self {
        Self {
            urban: 0.018018,
            rural: 0.045045,
        }
    }
}

impl WeightProfile {
    pub fn weight_for(&self, class: SiteClass) -> f64 {
        match class {
            SiteClass::Urban => self.urban,
            SiteClass::Rural => self.rural,
        }
    }
}

/// A weighted generator point of the power diagram.
///
/// A site has no stored id: its identity is its index in the input sequence,
/// preserved through every stage so results map back to source records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub position: Point2<f64>,
    /// Non-negative radius-like weight.
    pub weight: f64,
}

impl Site {
    pub fn new(position: Point2<f64>, weight: f64) -> Self {
        Self { position, weight }
    }

    /// Power distance `|p - site|^2 - weight^2` from `p` to this site.
    pub fn power_distance(&self, p: &Point2<f64>) -> f64 {
        let d = p - self.position;
        d.norm_squared() - self.weight * self.weight
    }

    /// Height of the site lifted onto the paraboloid `z = x^2 + y^2 - w^2`.
    ///
    /// On the lifted points the power diagram turns into an ordinary lower
    /// convex hull problem, which is what the triangulation predicates use.
    pub fn lifted(&self) -> f64 {
        self.position.x * self.position.x + self.position.y * self.position.y
            - self.weight * self.weight
    }
}

/// Drops records whose coordinates are both exactly 0.0, the survey format's
/// sentinel for a missing GPS reading. Callers clean *before* building so
/// site indices refer to the cleaned sequence.
pub fn drop_null_positions(
    records: Vec<(Point2<f64>, SiteClass)>,
) -> Vec<(Point2<f64>, SiteClass)> {
    records
        .into_iter()
        .filter(|(p, _)| p.x != 0.0 || p.y != 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn power_distance_subtracts_squared_weight() {
        let site = Site::new(Point2::new(1.0, 2.0), 3.0);
        let p = Point2::new(4.0, 6.0);
        assert_relative_eq!(site.power_distance(&p), 25.0 - 9.0);
    }

    #[test]
    fn default_profile_matches_survey_radii() {
        let profile = WeightProfile::default();
        assert_relative_eq!(profile.weight_for(SiteClass::Urban), 0.018018);
        assert_relative_eq!(profile.weight_for(SiteClass::Rural), 0.045045);
        assert!(profile.rural > profile.urban);
    }

    #[test]
    fn null_positions_are_dropped() {
        let records = vec![
            (Point2::new(0.0, 0.0), SiteClass::Urban),
            (Point2::new(77.2, 28.6), SiteClass::Urban),
            (Point2::new(0.0, 12.0), SiteClass::Rural),
        ];
        let cleaned = drop_null_positions(records);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].0, Point2::new(77.2, 28.6));
    }
}
