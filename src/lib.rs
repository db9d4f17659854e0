// src/lib.rs

//! Weighted (Laguerre) Voronoi partitioning for geospatial survey sites.
//!
//! Survey points carry an urban/rural classification that maps to a
//! radius-like weight; the crate computes the power triangulation of the
//! weighted sites, derives each site's cell as a set of parametric edges,
//! reconstructs the cells as closed polygons, and reconciles every site
//! back to exactly one polygon by containment. Reading the survey files and
//! exporting the combined records are the caller's collaborators; this
//! crate is only the geometry engine between them.
//!
//! ```
//! use laguerre_voronoi::{SiteClass, WeightedVoronoiBuilder};
//! use nalgebra::Point2;
//!
//! let records = vec![
//!     (Point2::new(77.20, 28.61), SiteClass::Urban),
//!     (Point2::new(77.10, 28.70), SiteClass::Rural),
//!     (Point2::new(77.35, 28.55), SiteClass::Rural),
//!     (Point2::new(77.28, 28.72), SiteClass::Urban),
//! ];
//! let diagram = WeightedVoronoiBuilder::new().build_classified(&records)?;
//! assert_eq!(diagram.reconciliation.assignments.len(), records.len());
//! # Ok::<(), laguerre_voronoi::VoronoiError>(())
//! ```

pub mod builder;
pub mod cells;
pub mod error;
pub mod polygon;
pub mod reconcile;
pub mod triangulation;
pub mod types;
pub mod utils;

pub use self::builder::{DiagramStatistics, WeightedVoronoi, WeightedVoronoiBuilder};
pub use self::cells::{VoronoiCellMap, build_voronoi_cells};
pub use self::error::{VoronoiError, VoronoiResult};
pub use self::polygon::{PolygonReconstructor, ReconstructionReport};
pub use self::reconcile::{ContainmentConflict, Reconciliation, reconcile};
pub use self::triangulation::{PowerTriangulation, PowerTriangulator};
pub use self::types::{CellEdge, Site, SiteClass, WeightProfile, drop_null_positions};
