// src/types/mod.rs

pub mod edge;
pub mod site;

pub use self::edge::CellEdge;
pub use self::site::{Site, SiteClass, WeightProfile, drop_null_positions};
