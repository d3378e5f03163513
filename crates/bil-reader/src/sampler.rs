//! Random-access lookup of single tiles.

use bil_common::{BilResult, GridGeometry, GridSpec, LayerDescriptor};
use tracing::debug;

use crate::iterator::{collect_values, NoDataPolicy};
use crate::reader::{TileBufferedReader, TileValue};
use crate::record::{TileLocation, TileRecord};

/// Reads one tile from every layer by seeking straight to it.
///
/// Records match those a sweep would produce for the same tile.
#[derive(Debug)]
pub struct PointSampler {
    geometry: GridGeometry,
    policy: NoDataPolicy,
    readers: Vec<TileBufferedReader>,
}

impl PointSampler {
    pub fn new(grid: GridSpec, policy: NoDataPolicy) -> Self {
        Self {
            geometry: grid.geometry(),
            policy,
            readers: Vec::new(),
        }
    }

    /// Register a layer, replacing any layer with the same key.
    pub fn set_layer(&mut self, layer: LayerDescriptor) -> BilResult<Option<LayerDescriptor>> {
        let reader = TileBufferedReader::new(layer, 1)?;
        let key = reader.layer().key().to_string();
        match self.readers.iter_mut().find(|r| r.layer().key() == key) {
            Some(slot) => Ok(Some(std::mem::replace(slot, reader).layer().clone())),
            None => {
                self.readers.push(reader);
                Ok(None)
            }
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.readers.iter().map(TileBufferedReader::layer)
    }

    /// Sample the tile containing `(lon, lat)`.
    ///
    /// `Ok(None)` if the coordinate is outside the grid or no layer has data
    /// there.
    pub fn sample(&mut self, lon: f64, lat: f64) -> BilResult<Option<TileRecord>> {
        match self.geometry.locate(lon, lat) {
            Some((row, col)) => self.sample_tile(row, col),
            None => {
                debug!(lon, lat, "Coordinate outside grid");
                Ok(None)
            }
        }
    }

    /// Sample the tile at `(row, col)`.
    pub fn sample_tile(&mut self, row: u32, col: u32) -> BilResult<Option<TileRecord>> {
        let spec = *self.geometry.spec();
        if row >= spec.rows() || col >= spec.columns() {
            return Ok(None);
        }
        let index = spec.absolute_index(row, col);

        let mut tiles: Vec<Option<TileValue>> = Vec::with_capacity(self.readers.len());
        for reader in &mut self.readers {
            tiles.push(reader.read_tile_at(index)?);
        }

        let layers = collect_values(
            self.readers
                .iter()
                .zip(&tiles)
                .map(|(reader, tile)| (reader.layer(), tile.as_ref())),
            self.policy,
        );
        if layers.is_empty() {
            return Ok(None);
        }

        Ok(Some(TileRecord {
            key: spec.tile_key(row, col),
            location: TileLocation::compute(&self.geometry, row, col),
            layers,
        }))
    }
}
