// src/error.rs
use thiserror::Error;

/// Fatal failures of the weighted Voronoi pipeline.
///
/// Only conditions that leave no usable result are errors. Recoverable
/// outcomes (containment conflicts, unassigned sites, degenerate cells) are
/// reported as diagnostic data by the stage that observes them.
#[derive(Error, Debug)]
pub enum VoronoiError {
    #[error("Insufficient sites for power triangulation: expected at least {expected}, got {actual}")]
    InsufficientSites { expected: usize, actual: usize },

    #[error("Degenerate input: sites {first} and {second} coincide")]
    CoincidentSites { first: usize, second: usize },

    #[error("Degenerate input: sites are collinear, no triangulation exists")]
    CollinearSites,

    #[error("Site {index} has negative weight {weight}")]
    NegativeWeight { index: usize, weight: f64 },

    #[error("Non-manifold adjacency: site pair ({first}, {second}) shared by {count} triangles")]
    NonManifoldEdge {
        first: usize,
        second: usize,
        count: usize,
    },

    #[error("Geometric calculation failed: {operation}")]
    GeometricFailure { operation: String },
}

pub type VoronoiResult<T> = Result<T, VoronoiError>;
