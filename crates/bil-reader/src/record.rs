//! Per-tile records produced by a sweep.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use bil_common::{GridGeometry, LayerDescriptor, LayerValue, TileCorners};

use crate::reader::TileValue;

/// The resolved contribution of one layer to a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileData {
    Scalar(LayerValue),
    /// One entry per band; `None` marks a no-data or dropped band.
    Bands(Vec<Option<LayerValue>>),
}

impl TileData {
    pub fn as_scalar(&self) -> Option<&LayerValue> {
        match self {
            TileData::Scalar(v) => Some(v),
            TileData::Bands(_) => None,
        }
    }
}

/// Resolve a decoded tile through the layer's no-data and translation rules.
///
/// Returns `None` when the layer contributes nothing to the record.
pub fn resolve_tile(layer: &LayerDescriptor, tile: &TileValue) -> Option<TileData> {
    match tile {
        TileValue::Scalar(raw) => layer.resolve(*raw).map(TileData::Scalar),
        TileValue::Bands(raw) => {
            let bands: Vec<Option<LayerValue>> = raw.iter().map(|&v| layer.resolve(v)).collect();
            if bands.iter().all(Option::is_none) {
                None
            } else {
                Some(TileData::Bands(bands))
            }
        }
    }
}

/// Layer key to value, in registration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerValues {
    entries: Vec<(String, TileData)>,
}

impl LayerValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, key: impl Into<String>, data: TileData) {
        self.entries.push((key.into(), data));
    }

    pub fn get(&self, key: &str) -> Option<&TileData> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, data)| data)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TileData)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LayerValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, data) in &self.entries {
            map.serialize_entry(key, data)?;
        }
        map.end()
    }
}

/// Coordinates attached to an accepted tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLocation {
    /// Tile centre as `(lon, lat)`.
    #[serde(rename = "pt")]
    pub point: (f64, f64),
    /// Tile centre as DMS strings `(lon, lat)`.
    pub dms: (String, String),
    /// Grid position as `(col, row)`.
    pub tile: (u32, u32),
    #[serde(rename = "bdec")]
    pub box_decimal: TileCorners<f64>,
    #[serde(rename = "bdms")]
    pub box_dms: TileCorners<String>,
}

impl TileLocation {
    pub fn compute(geometry: &GridGeometry, row: u32, col: u32) -> Self {
        let bounds = geometry.bounds(row, col);
        Self {
            point: geometry.point(row, col),
            dms: geometry.dms(row, col),
            tile: (col, row),
            box_decimal: bounds.decimal,
            box_dms: bounds.dms,
        }
    }
}

/// One accepted tile: its key, layer values and location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileRecord {
    /// Absolute tile key (`row * columns + col + 1`).
    pub key: u64,
    #[serde(flatten)]
    pub location: TileLocation,
    #[serde(flatten)]
    pub layers: LayerValues,
}

impl TileRecord {
    pub fn row(&self) -> u32 {
        self.location.tile.1
    }

    pub fn col(&self) -> u32 {
        self.location.tile.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::register_bil;
    use bil_common::{grids, Encoding};
    use serde_json::json;

    #[test]
    fn test_resolve_multiband_marks_invalid_bands() {
        let dir = tempfile::tempdir().unwrap();
        let layer = register_bil(dir.path(), "rgb", Encoding::SignedShort, 3, -9999, &[0, 0, 0]);

        let data = resolve_tile(&layer, &TileValue::Bands(vec![1, -9999, 3])).unwrap();
        assert_eq!(
            data,
            TileData::Bands(vec![
                Some(LayerValue::Integer(1)),
                None,
                Some(LayerValue::Integer(3))
            ])
        );
        assert_eq!(
            resolve_tile(&layer, &TileValue::Bands(vec![-9999, -9999, -9999])),
            None
        );
    }

    #[test]
    fn test_layer_values_serialize_in_insertion_order() {
        let mut values = LayerValues::new();
        values.push("zeta", TileData::Scalar(LayerValue::Integer(1)));
        values.push("alpha", TileData::Scalar(LayerValue::from("X")));
        values.push(
            "mid",
            TileData::Bands(vec![None, Some(LayerValue::Integer(2))]),
        );

        let text = serde_json::to_string(&values).unwrap();
        assert_eq!(text, r#"{"zeta":1,"alpha":"X","mid":[null,2]}"#);
        assert_eq!(values.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_record_json_shape() {
        let geometry = grids::worldclim_30s().geometry();
        let mut layers = LayerValues::new();
        layers.push("alt", TileData::Scalar(LayerValue::Integer(12)));

        let record = TileRecord {
            key: 1,
            location: TileLocation::compute(&geometry, 0, 0),
            layers,
        };
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["key"], json!(1));
        assert_eq!(value["alt"], json!(12));
        assert_eq!(value["tile"], json!([0, 0]));
        assert_eq!(value["dms"][0], json!("179°59'45\"W"));
        assert_eq!(value["bdec"][0], json!([-180.0, 90.0]));
        assert_eq!(value["bdms"][1][1], json!("89°59'30\"N"));
        assert_eq!(record.row(), 0);
        assert_eq!(record.col(), 0);
    }
}
