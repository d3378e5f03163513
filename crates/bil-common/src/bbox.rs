//! Bounding box types for grid extents and individual tiles.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

/// The corners of one tile, as `[[left, top], [right, bottom]]`.
///
/// Serializes as the nested two-by-two array stored alongside each record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileCorners<T> {
    pub corners: [[T; 2]; 2],
}

impl<T: Clone> TileCorners<T> {
    pub fn new(left: T, top: T, right: T, bottom: T) -> Self {
        Self {
            corners: [[left, top], [right, bottom]],
        }
    }

    pub fn left(&self) -> &T {
        &self.corners[0][0]
    }

    pub fn top(&self) -> &T {
        &self.corners[0][1]
    }

    pub fn right(&self) -> &T {
        &self.corners[1][0]
    }

    pub fn bottom(&self) -> &T {
        &self.corners[1][1]
    }
}

/// Decimal and DMS corners of a tile, computed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub decimal: TileCorners<f64>,
    pub dms: TileCorners<String>,
}

impl TileBounds {
    /// Convert the decimal corners into a min/max bounding box.
    pub fn to_bbox(&self) -> BoundingBox {
        let (left, right) = (*self.decimal.left(), *self.decimal.right());
        let (top, bottom) = (*self.decimal.top(), *self.decimal.bottom());
        BoundingBox::new(
            left.min(right),
            top.min(bottom),
            left.max(right),
            top.max(bottom),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_corners_serialize_as_nested_arrays() {
        let corners = TileCorners::new(-180.0, 90.0, -179.5, 89.5);
        let json = serde_json::to_string(&corners).unwrap();
        assert_eq!(json, "[[-180.0,90.0],[-179.5,89.5]]");
    }

    #[test]
    fn test_tile_bounds_to_bbox() {
        let bounds = TileBounds {
            decimal: TileCorners::new(10.0, 5.0, 11.0, 4.0),
            dms: TileCorners::new(
                "10°0'0\"E".to_string(),
                "5°0'0\"N".to_string(),
                "11°0'0\"E".to_string(),
                "4°0'0\"N".to_string(),
            ),
        };
        let bbox = bounds.to_bbox();
        assert_eq!(bbox, BoundingBox::new(10.0, 4.0, 11.0, 5.0));
    }
}
