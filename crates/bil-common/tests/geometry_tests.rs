//! Tests for grid specifications and tile geometry.

use bil_common::{grids, Axis, GridSpec};
use test_utils::{assert_approx_eq, assert_coords_approx_eq};

// ============================================================================
// GridSpec invariants
// ============================================================================

#[test]
fn test_dimensions_multiply_back_to_extent() {
    for &(res, extent) in &[
        (30, (360, 150)),
        (150, (360, 150)),
        (300, (10, 5)),
        (3600, (1, 1)),
        (45, (1, 2)),
    ] {
        let grid = GridSpec::new(res, (-180, 90), extent).unwrap();
        assert_eq!(grid.columns() as u64 * res as u64, extent.0 as u64 * 3600);
        assert_eq!(grid.rows() as u64 * res as u64, extent.1 as u64 * 3600);
    }
}

#[test]
fn test_non_dividing_resolution_fails() {
    for res in [7, 11, 49, 7200 * 3] {
        assert!(
            GridSpec::new(res, (-180, 90), (1, 1)).is_err(),
            "resolution {} should be rejected",
            res
        );
    }
}

#[test]
fn test_position_round_trip() {
    let grid = grids::worldclim_30s();
    for index in [0u64, 1, 43_199, 43_200, 777_600_000 - 1] {
        let (row, col) = grid.position(index);
        assert_eq!(grid.absolute_index(row, col), index);
        assert_eq!(grid.tile_key(row, col), index + 1);
    }
    assert_eq!(grid.tile_count(), 777_600_000);
}

// ============================================================================
// Coordinates
// ============================================================================

#[test]
fn test_worldclim_first_tile_point() {
    let geo = grids::worldclim_30s().geometry();
    assert_coords_approx_eq!(geo.point(0, 0), (-179.9958, 89.9958), 1e-4);
}

#[test]
fn test_longitude_continuous_across_antimeridian() {
    let grid = grids::worldclim_30s();
    let geo = grid.geometry();
    let last = grid.columns() - 1;

    let first = geo.longitude(0);
    let end = geo.longitude(last);
    assert_approx_eq!(first.decimal, -179.995833, 1e-6);
    assert_approx_eq!(end.decimal, 179.995833, 1e-6);
    assert_eq!(first.to_dms(Axis::Longitude), "179°59'45\"W");
    assert_eq!(end.to_dms(Axis::Longitude), "179°59'45\"E");

    // Every column steps east by exactly one resolution.
    let step = 30.0 / 3600.0;
    for col in [0, 1, 21_599, 21_600, last - 1] {
        let delta = geo.longitude(col + 1).decimal - geo.longitude(col).decimal;
        assert_approx_eq!(delta, step, 1e-9);
    }

    // Tiles on both sides of the antimeridian share an edge at ±180.
    assert_eq!(*geo.bounds(0, 0).decimal.left(), -180.0);
    assert_eq!(*geo.bounds(0, last).decimal.right(), 180.0);
}

#[test]
fn test_hemisphere_switch_at_prime_meridian() {
    let geo = grids::worldclim_30s().geometry();
    let west = geo.longitude(21_599);
    let east = geo.longitude(21_600);
    assert_eq!(west.to_dms(Axis::Longitude), "0°0'15\"W");
    assert_eq!(east.to_dms(Axis::Longitude), "0°0'15\"E");
}

#[test]
fn test_latitude_counts_south_from_positive_origin() {
    let grid = grids::worldclim_30s();
    let geo = grid.geometry();

    let last = geo.latitude(grid.rows() - 1);
    assert_approx_eq!(last.decimal, -59.995833, 1e-6);
    assert_eq!(last.to_dms(Axis::Latitude), "59°59'45\"S");

    let bounds = geo.bounds(grid.rows() - 1, 0);
    assert_eq!(*bounds.decimal.bottom(), -60.0);
    assert_eq!(bounds.dms.bottom(), "60°0'0\"S");
}

#[test]
fn test_negative_latitude_origin_counts_north() {
    let grid = GridSpec::new(3600, (10, -10), (2, 2)).unwrap();
    let geo = grid.geometry();
    assert_coords_approx_eq!(geo.point(0, 0), (9.5, -9.5), 1e-9);
    assert_coords_approx_eq!(geo.point(1, 1), (8.5, -8.5), 1e-9);
}

#[test]
fn test_extent_box() {
    let bbox = grids::worldclim_30s().geometry().extent_box();
    assert_eq!(bbox.min_x, -180.0);
    assert_eq!(bbox.max_x, 180.0);
    assert_eq!(bbox.min_y, -60.0);
    assert_eq!(bbox.max_y, 90.0);
}

#[test]
fn test_locate_edges() {
    let geo = grids::worldclim_30s().geometry();
    assert_eq!(geo.locate(-180.0, 90.0), Some((0, 0)));
    assert_eq!(geo.locate(180.0, 0.0), None);
    assert_eq!(geo.locate(0.0, -60.0), None);
    assert_eq!(geo.locate(-181.0, 0.0), None);
    assert_eq!(geo.locate(0.0, 0.0), Some((10_800, 21_600)));
}
