//! Drops tiles without data and attaches coordinates to the rest.

use bil_common::{BilResult, GridGeometry};

use crate::iterator::MultiFileTileIterator;
use crate::record::{LayerValues, TileLocation, TileRecord};

/// Yields only tiles where at least one layer has data.
#[derive(Debug)]
pub struct ValidTileFilter {
    inner: MultiFileTileIterator,
    geometry: GridGeometry,
    /// Layer values of the current tile once it has been accepted.
    pending: Option<(u64, LayerValues)>,
}

impl ValidTileFilter {
    pub fn new(inner: MultiFileTileIterator) -> Self {
        let geometry = inner.grid().geometry();
        Self {
            inner,
            geometry,
            pending: None,
        }
    }

    pub fn inner(&self) -> &MultiFileTileIterator {
        &self.inner
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// A record is kept when some layer contributed a value.
    pub fn accept(values: &LayerValues) -> bool {
        !values.is_empty()
    }

    pub fn rewind(&mut self) -> BilResult<()> {
        self.pending = None;
        self.inner.rewind()
    }

    /// Move the inner iterator to the next accepted tile.
    ///
    /// Returns false once the inner iterator is exhausted.
    pub fn has_more(&mut self) -> BilResult<bool> {
        while self.inner.has_more()? {
            let key = self.inner.key();
            if matches!(&self.pending, Some((k, _)) if *k == key) {
                return Ok(true);
            }

            let values = self.inner.current();
            if Self::accept(&values) {
                self.pending = Some((key, values));
                return Ok(true);
            }
            self.inner.advance();
        }
        self.pending = None;
        Ok(false)
    }

    /// The current tile with its location, or `None` if it has no data.
    pub fn current(&self) -> Option<TileRecord> {
        let key = self.inner.key();
        let layers = match &self.pending {
            Some((k, values)) if *k == key => values.clone(),
            _ => self.inner.current(),
        };
        if !Self::accept(&layers) {
            return None;
        }
        Some(self.record(key, layers))
    }

    pub fn advance(&mut self) {
        self.pending = None;
        self.inner.advance();
    }

    fn record(&self, key: u64, layers: LayerValues) -> TileRecord {
        let (row, col) = (self.inner.row(), self.inner.col());
        TileRecord {
            key,
            location: TileLocation::compute(&self.geometry, row, col),
            layers,
        }
    }
}

impl Iterator for ValidTileFilter {
    type Item = BilResult<TileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_more() {
            Ok(true) => {
                let key = self.inner.key();
                let layers = match self.pending.take() {
                    Some((_, values)) => values,
                    None => self.inner.current(),
                };
                let record = self.record(key, layers);
                self.advance();
                Some(Ok(record))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::{IteratorOptions, NoDataPolicy};
    use crate::testdata::register_bil;
    use bil_common::{Encoding, GridSpec, LayerValue};

    use crate::record::TileData;

    fn filter_over(values: &[i64], no_data: i64, dir: &tempfile::TempDir) -> ValidTileFilter {
        let grid = GridSpec::new(3600, (0, 2), (5, 2)).unwrap();
        let mut iter = MultiFileTileIterator::new(
            grid,
            IteratorOptions {
                buffer_tiles: 3,
                skip: 0,
                policy: NoDataPolicy::CheckAllLayers,
            },
        )
        .unwrap();
        iter.set_layer(register_bil(dir.path(), "v", Encoding::SignedShort, 1, no_data, values))
            .unwrap();
        ValidTileFilter::new(iter)
    }

    #[test]
    fn test_accept() {
        let mut values = LayerValues::new();
        assert!(!ValidTileFilter::accept(&values));
        values.push("a", TileData::Scalar(LayerValue::Integer(1)));
        assert!(ValidTileFilter::accept(&values));
    }

    #[test]
    fn test_has_more_skips_rejected_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let mut filter = filter_over(&[0, 0, 0, 0, 7, 0, 0, 0, 0, 9], 0, &dir);

        assert!(filter.has_more().unwrap());
        let record = filter.current().unwrap();
        assert_eq!(record.key, 5);
        assert_eq!(record.location.tile, (4, 0));
        // Repeated calls stay on the same tile.
        assert!(filter.has_more().unwrap());
        assert_eq!(filter.current().unwrap().key, 5);

        filter.advance();
        assert!(filter.has_more().unwrap());
        assert_eq!(filter.current().unwrap().key, 10);
        filter.advance();
        assert!(!filter.has_more().unwrap());
    }

    #[test]
    fn test_records_carry_location() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<TileRecord> = filter_over(&[0, 0, 0, 0, 0, 0, 3, 0, 0, 0], 0, &dir)
            .collect::<BilResult<_>>()
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!((record.row(), record.col()), (1, 1));
        assert_eq!(record.location.point, (1.5, 0.5));
        assert_eq!(
            record.location.dms,
            ("1°30'0\"E".to_string(), "0°30'0\"N".to_string())
        );
        assert_eq!(*record.location.box_decimal.left(), 1.0);
        assert_eq!(*record.location.box_decimal.bottom(), 0.0);
        assert_eq!(
            record.layers.get("v"),
            Some(&TileData::Scalar(LayerValue::Integer(3)))
        );
    }

    #[test]
    fn test_rewind_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let mut filter = filter_over(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], -9999, &dir);
        assert_eq!(filter.by_ref().take(4).count(), 4);
        filter.rewind().unwrap();
        assert_eq!(filter.count(), 10);
    }
}
