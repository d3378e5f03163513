//! Common test fixtures for BIL tile tests.
//!
//! This module provides pre-defined grid parameters and no-data sentinels matching
//! the collections the loader is used with.

/// Grid parameters as `(resolution_seconds, (lon, lat) origin, (lon, lat) extent)`.
pub mod grid {
    pub type GridParams = (u32, (i32, i32), (u32, u32));

    /// WorldClim 30 arc-second global grid (43200 x 18000 tiles).
    pub const WORLDCLIM_30S: GridParams = (30, (-180, 90), (360, 150));

    /// One-degree square split into 2 x 2 tiles.
    pub const ONE_DEGREE_2X2: GridParams = (1800, (0, 1), (1, 1));

    /// One-degree square split into 10 x 10 tiles at the origin.
    pub const ONE_DEGREE_10X10: GridParams = (360, (0, 1), (1, 1));
}

/// Common no-data sentinels.
pub mod no_data {
    /// WorldClim climate and elevation layers.
    pub const WORLDCLIM: i64 = -9999;

    /// Global environmental stratification (unsigned byte classes).
    pub const GENS: i64 = 0;
}
