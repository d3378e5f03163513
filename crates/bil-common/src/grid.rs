//! Fixed-resolution geographic grids and their tile geometry.
//!
//! A grid is described by its resolution in arc-seconds, the degree
//! coordinates of its first vertex and its extent in whole degrees. Rows and
//! columns are counted away from the origin: from a positive origin the
//! coordinate decreases with the index (latitude 90 counting south), from a
//! zero or negative origin it increases (longitude -180 counting east).

use serde::{Deserialize, Serialize};

use crate::bbox::{BoundingBox, TileBounds, TileCorners};
use crate::error::{BilError, BilResult};

/// Arc-seconds in one degree.
pub const SECONDS_PER_DEGREE: i64 = 3600;

/// Specification of a regular lat/lon tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridSpecDef", into = "GridSpecDef")]
pub struct GridSpec {
    resolution_seconds: u32,
    origin: (i32, i32),
    extent: (u32, u32),
    columns: u32,
    rows: u32,
}

/// Serialized form of a [`GridSpec`]; validated on conversion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct GridSpecDef {
    resolution_seconds: u32,
    /// `[longitude, latitude]` of the first tile vertex.
    origin: [i32; 2],
    /// `[longitude, latitude]` span in degrees.
    extent: [u32; 2],
}

impl TryFrom<GridSpecDef> for GridSpec {
    type Error = BilError;

    fn try_from(def: GridSpecDef) -> BilResult<Self> {
        GridSpec::new(
            def.resolution_seconds,
            (def.origin[0], def.origin[1]),
            (def.extent[0], def.extent[1]),
        )
    }
}

impl From<GridSpec> for GridSpecDef {
    fn from(spec: GridSpec) -> Self {
        Self {
            resolution_seconds: spec.resolution_seconds,
            origin: [spec.origin.0, spec.origin.1],
            extent: [spec.extent.0, spec.extent.1],
        }
    }
}

impl GridSpec {
    /// Create and validate a grid specification.
    ///
    /// `origin` and `extent` are `(longitude, latitude)` pairs in degrees.
    /// Fails with [`BilError::Config`] unless the resolution evenly divides
    /// both extents and the edge opposite the origin stays on the globe.
    pub fn new(resolution_seconds: u32, origin: (i32, i32), extent: (u32, u32)) -> BilResult<Self> {
        if resolution_seconds == 0 {
            return Err(BilError::config("resolution must be > 0 seconds"));
        }
        if !(-180..=180).contains(&origin.0) || !(-90..=90).contains(&origin.1) {
            return Err(BilError::config(format!(
                "origin ({}, {}) is not a valid longitude/latitude pair",
                origin.0, origin.1
            )));
        }
        if extent.0 == 0 || extent.1 == 0 || extent.0 > 360 || extent.1 > 180 {
            return Err(BilError::config(format!(
                "extent ({}, {}) must be within 1..=360 x 1..=180 degrees",
                extent.0, extent.1
            )));
        }

        check_far_edge(origin.0, extent.0, 180, "longitude")?;
        check_far_edge(origin.1, extent.1, 90, "latitude")?;

        let columns = divide_extent(extent.0, resolution_seconds, "longitude")?;
        let rows = divide_extent(extent.1, resolution_seconds, "latitude")?;

        Ok(Self {
            resolution_seconds,
            origin,
            extent,
            columns,
            rows,
        })
    }

    pub fn resolution_seconds(&self) -> u32 {
        self.resolution_seconds
    }

    /// `(longitude, latitude)` of the first vertex, in degrees.
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    /// `(longitude, latitude)` span, in degrees.
    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of tiles in the grid.
    pub fn tile_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Zero-based absolute position of a tile in row-major order.
    pub fn absolute_index(&self, row: u32, col: u32) -> u64 {
        row as u64 * self.columns as u64 + col as u64
    }

    /// Inverse of [`absolute_index`](Self::absolute_index): `(row, col)`.
    pub fn position(&self, index: u64) -> (u32, u32) {
        let columns = self.columns as u64;
        ((index / columns) as u32, (index % columns) as u32)
    }

    /// Record key of a tile: `row * columns + (col + 1)`.
    ///
    /// The one-based column term matches the keys already present in
    /// loaded collections.
    pub fn tile_key(&self, row: u32, col: u32) -> u64 {
        self.absolute_index(row, col) + 1
    }

    /// Geometry helper bound to this grid.
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(*self)
    }
}

/// The edge opposite the origin must stay within `-limit..=limit`.
fn check_far_edge(origin: i32, extent: u32, limit: i64, axis: &str) -> BilResult<()> {
    let origin = origin as i64;
    let far = if origin > 0 {
        origin - extent as i64
    } else {
        origin + extent as i64
    };
    if far < -limit || far > limit {
        return Err(BilError::config(format!(
            "{} extent {} from origin {} ends at {}, outside -{}..={}",
            axis, extent, origin, far, limit, limit
        )));
    }
    Ok(())
}

fn divide_extent(degrees: u32, resolution_seconds: u32, axis: &str) -> BilResult<u32> {
    let seconds = degrees as u64 * SECONDS_PER_DEGREE as u64;
    if seconds % resolution_seconds as u64 != 0 {
        return Err(BilError::config(format!(
            "resolution of {}\" does not evenly divide the {} extent of {}°",
            resolution_seconds, axis, degrees
        )));
    }
    Ok((seconds / resolution_seconds as u64) as u32)
}

/// Which coordinate a value belongs to; selects the hemisphere letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Longitude,
    Latitude,
}

impl Axis {
    /// Hemisphere letter for a decimal coordinate (west/south are negative).
    pub fn hemisphere(&self, decimal: f64) -> char {
        match (self, decimal < 0.0) {
            (Axis::Longitude, true) => 'W',
            (Axis::Longitude, false) => 'E',
            (Axis::Latitude, true) => 'S',
            (Axis::Latitude, false) => 'N',
        }
    }
}

/// A coordinate as decimal degrees plus its degrees/minutes/seconds split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Degrees {
    pub decimal: f64,
    /// Whole degrees, truncated toward zero (carries the sign).
    pub degrees: i64,
    pub minutes: u32,
    pub seconds: f64,
}

impl Degrees {
    /// Render as `D°M'S"H`, e.g. `179°59'45"W`.
    pub fn to_dms(&self, axis: Axis) -> String {
        format!(
            "{}°{}'{}\"{}",
            self.degrees.abs(),
            self.minutes,
            self.seconds,
            axis.hemisphere(self.decimal)
        )
    }
}

/// Maps grid positions to coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    spec: GridSpec,
}

impl GridGeometry {
    pub fn new(spec: GridSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Convert a row or column index into degrees.
    ///
    /// `delta_seconds` shifts the result away from the tile's origin-side
    /// edge: `0` gives that edge, half the resolution gives the centre and
    /// the full resolution gives the opposite edge.
    pub fn degrees(&self, origin_deg: i32, index: u32, delta_seconds: f64) -> Degrees {
        let origin = (origin_deg as i64 * SECONDS_PER_DEGREE) as f64;
        let step = index as f64 * self.spec.resolution_seconds as f64;
        let seconds = if origin_deg > 0 {
            origin - delta_seconds - step
        } else {
            origin + delta_seconds + step
        };

        let decimal = seconds / SECONDS_PER_DEGREE as f64;
        let degrees = if seconds >= 0.0 {
            decimal.floor()
        } else {
            decimal.ceil()
        };

        let remainder = (seconds - degrees * SECONDS_PER_DEGREE as f64).abs();
        let minutes = (remainder / 60.0).floor();

        Degrees {
            decimal,
            degrees: degrees as i64,
            minutes: minutes as u32,
            seconds: remainder - minutes * 60.0,
        }
    }

    fn half_step(&self) -> f64 {
        self.spec.resolution_seconds as f64 / 2.0
    }

    /// Centre longitude of a column.
    pub fn longitude(&self, col: u32) -> Degrees {
        self.degrees(self.spec.origin.0, col, self.half_step())
    }

    /// Centre latitude of a row.
    pub fn latitude(&self, row: u32) -> Degrees {
        self.degrees(self.spec.origin.1, row, self.half_step())
    }

    /// Centre of a tile as decimal `(lon, lat)`.
    pub fn point(&self, row: u32, col: u32) -> (f64, f64) {
        (self.longitude(col).decimal, self.latitude(row).decimal)
    }

    /// Centre of a tile as DMS `(lon, lat)` strings.
    pub fn dms(&self, row: u32, col: u32) -> (String, String) {
        (
            self.longitude(col).to_dms(Axis::Longitude),
            self.latitude(row).to_dms(Axis::Latitude),
        )
    }

    /// Corners of a tile in decimal and DMS form.
    pub fn bounds(&self, row: u32, col: u32) -> TileBounds {
        let full = self.spec.resolution_seconds as f64;
        let (lon_origin, lat_origin) = self.spec.origin;

        let left = self.degrees(lon_origin, col, 0.0);
        let right = self.degrees(lon_origin, col, full);
        let top = self.degrees(lat_origin, row, 0.0);
        let bottom = self.degrees(lat_origin, row, full);

        TileBounds {
            decimal: TileCorners::new(left.decimal, top.decimal, right.decimal, bottom.decimal),
            dms: TileCorners::new(
                left.to_dms(Axis::Longitude),
                top.to_dms(Axis::Latitude),
                right.to_dms(Axis::Longitude),
                bottom.to_dms(Axis::Latitude),
            ),
        }
    }

    /// Find the `(row, col)` of the tile containing a coordinate.
    ///
    /// Returns `None` for coordinates outside the grid. A tile owns its
    /// origin-side edges.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<(u32, u32)> {
        let col = self.axis_index(self.spec.origin.0, lon, self.spec.columns)?;
        let row = self.axis_index(self.spec.origin.1, lat, self.spec.rows)?;
        Some((row, col))
    }

    fn axis_index(&self, origin_deg: i32, value: f64, count: u32) -> Option<u32> {
        if !value.is_finite() {
            return None;
        }
        let origin = origin_deg as f64 * SECONDS_PER_DEGREE as f64;
        let value = value * SECONDS_PER_DEGREE as f64;
        let offset = if origin_deg > 0 {
            origin - value
        } else {
            value - origin
        };
        if offset < 0.0 {
            return None;
        }
        let index = (offset / self.spec.resolution_seconds as f64).floor();
        if index >= count as f64 {
            return None;
        }
        Some(index as u32)
    }

    /// Decimal bounding box of the whole grid.
    pub fn extent_box(&self) -> BoundingBox {
        let first = self.bounds(0, 0).to_bbox();
        let last = self
            .bounds(self.spec.rows - 1, self.spec.columns - 1)
            .to_bbox();
        BoundingBox::new(
            first.min_x.min(last.min_x),
            first.min_y.min(last.min_y),
            first.max_x.max(last.max_x),
            first.max_y.max(last.max_y),
        )
    }
}

/// Common grid definitions.
pub mod grids {
    use super::*;

    /// WorldClim 30 arc-second grid: 180°W..180°E, 90°N..60°S.
    pub fn worldclim_30s() -> GridSpec {
        GridSpec {
            resolution_seconds: 30,
            origin: (-180, 90),
            extent: (360, 150),
            columns: 43_200,
            rows: 18_000,
        }
    }

    /// WorldClim 2.5 arc-minute grid over the same extent.
    pub fn worldclim_2_5m() -> GridSpec {
        GridSpec {
            resolution_seconds: 150,
            origin: (-180, 90),
            extent: (360, 150),
            columns: 8_640,
            rows: 3_600,
        }
    }
}
