// src/utils.rs

/// Numeric constants shared across the crate.
pub mod constants {
    /// Tolerance for predicate sign decisions and degeneracy checks.
    pub const EPSILON: f64 = 1e-10;

    /// Default finite magnitude substituted for infinite edge parameters
    /// when cells are turned into polygons. An approximation of the true
    /// unbounded cell; only meaningful while the working coordinate extent
    /// stays well below this value.
    pub const DEFAULT_CLAMP: f64 = 10.0;

    /// Side-length multiple of the site bounding box used for the
    /// super-triangle that seeds the incremental triangulation. Large enough
    /// to enclose every real circumcenter, small enough to keep the lifted
    /// predicate determinants inside f64 precision.
    pub const SUPER_TRIANGLE_SCALE: f64 = 64.0;
}

/// Tolerance-based float comparisons.
pub mod comparison {
    use super::constants::EPSILON;

    /// Whether a float is zero within [`EPSILON`]. Used for the degeneracy
    /// gates on reconstructed ring areas.
    pub fn nearly_zero(a: f64) -> bool {
        a.abs() < EPSILON
    }
}
