//! Storage document shape of one tile record.

use serde::Serialize;

use bil_common::TileCorners;
use bil_reader::{LayerValues, TileRecord};

/// GeoJSON point geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            kind: "Point",
            coordinates: [lon, lat],
        }
    }
}

/// Document keyed by the tile key, with the point stored as GeoJSON so the
/// store can index it.
#[derive(Debug, Serialize)]
pub struct TileDocument<'a> {
    #[serde(rename = "_id")]
    pub id: u64,
    pub pt: GeoPoint,
    pub dms: &'a (String, String),
    pub tile: (u32, u32),
    pub bdec: &'a TileCorners<f64>,
    pub bdms: &'a TileCorners<String>,
    #[serde(flatten)]
    pub layers: &'a LayerValues,
}

impl<'a> From<&'a TileRecord> for TileDocument<'a> {
    fn from(record: &'a TileRecord) -> Self {
        let (lon, lat) = record.location.point;
        Self {
            id: record.key,
            pt: GeoPoint::new(lon, lat),
            dms: &record.location.dms,
            tile: record.location.tile,
            bdec: &record.location.box_decimal,
            bdms: &record.location.box_dms,
            layers: &record.layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bil_common::{Encoding, GridSpec, LayerValue};
    use bil_reader::testdata::register_bil;
    use bil_reader::{IteratorOptions, MultiFileTileIterator, TileData, ValidTileFilter};
    use serde_json::json;

    #[test]
    fn test_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let grid = GridSpec::new(1800, (0, 1), (1, 1)).unwrap();
        let mut iter = MultiFileTileIterator::new(grid, IteratorOptions::default()).unwrap();
        iter.set_layer(register_bil(dir.path(), "alt", Encoding::SignedShort, 1, -9999, &[-9999, 42]))
            .unwrap();

        let record = ValidTileFilter::new(iter).next().unwrap().unwrap();
        assert_eq!(
            record.layers.get("alt"),
            Some(&TileData::Scalar(LayerValue::Integer(42)))
        );

        let doc = serde_json::to_value(TileDocument::from(&record)).unwrap();
        assert_eq!(
            doc,
            json!({
                "_id": 2,
                "pt": {"type": "Point", "coordinates": [0.75, 0.75]},
                "dms": ["0°45'0\"E", "0°45'0\"N"],
                "tile": [1, 0],
                "bdec": [[0.5, 1.0], [1.0, 0.5]],
                "bdms": [["0°30'0\"E", "1°0'0\"N"], ["1°0'0\"E", "0°30'0\"N"]],
                "alt": 42
            })
        );
    }
}
