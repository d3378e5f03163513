//! Lockstep iteration over several layer files sharing one grid.
//!
//! Every registered layer is read through its own [`TileBufferedReader`].
//! The iterator keeps one logical position (`row`, `col`, offset within the
//! current window) and refills all windows together, so tile `n` of every
//! layer is always examined at the same step.
//!
//! ```text
//!  Uninitialized --rewind()--> Ready --has_more()==false--> Exhausted
//!        ^                                                     |
//!        +------------- set_layer() / remove_layer() ----------+
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bil_common::{BilError, BilResult, GridSpec, LayerDescriptor};

use crate::reader::{TileBufferedReader, TileValue};
use crate::record::{resolve_tile, LayerValues};

/// Default number of tiles held per layer window.
pub const DEFAULT_BUFFER_TILES: usize = 4320;

/// How no-data in the first registered layer affects the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataPolicy {
    /// Resolve every layer independently.
    CheckAllLayers,
    /// Skip the remaining layers when the first one has no data.
    #[default]
    ShortCircuitOnFirst,
}

/// Construction options of a [`MultiFileTileIterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IteratorOptions {
    /// Tiles per layer window.
    pub buffer_tiles: usize,
    /// Absolute tile offset to start from.
    pub skip: u64,
    pub policy: NoDataPolicy,
}

impl Default for IteratorOptions {
    fn default() -> Self {
        Self {
            buffer_tiles: DEFAULT_BUFFER_TILES,
            skip: 0,
            policy: NoDataPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    Uninitialized,
    Ready,
    Exhausted,
}

/// Logical position of the iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IterationState {
    pub row: u32,
    pub col: u32,
    pub tile_index_in_window: usize,
    /// Tile count of the current window (first non-empty layer).
    pub window_len: usize,
    pub skip: u64,
}

/// Iterates the tiles of a grid across all registered layers.
#[derive(Debug)]
pub struct MultiFileTileIterator {
    grid: GridSpec,
    options: IteratorOptions,
    readers: Vec<TileBufferedReader>,
    position: IterationState,
    state: IteratorState,
}

impl MultiFileTileIterator {
    pub fn new(grid: GridSpec, options: IteratorOptions) -> BilResult<Self> {
        if options.buffer_tiles == 0 {
            return Err(BilError::config("buffer_tiles must be > 0"));
        }
        if options.skip >= grid.tile_count() {
            return Err(BilError::config(format!(
                "skip {} is past the last tile ({} tiles)",
                options.skip,
                grid.tile_count()
            )));
        }

        let (row, col) = grid.position(options.skip);
        Ok(Self {
            grid,
            options,
            readers: Vec::new(),
            position: IterationState {
                row,
                col,
                skip: options.skip,
                ..Default::default()
            },
            state: IteratorState::Uninitialized,
        })
    }

    /// Register a layer, replacing any layer with the same key in place.
    ///
    /// Returns the replaced descriptor. The iterator must be rewound before
    /// it is used again.
    pub fn set_layer(&mut self, layer: LayerDescriptor) -> BilResult<Option<LayerDescriptor>> {
        let reader = TileBufferedReader::new(layer, self.options.buffer_tiles)?;
        self.state = IteratorState::Uninitialized;

        let key = reader.layer().key().to_string();
        match self.readers.iter_mut().find(|r| r.layer().key() == key) {
            Some(slot) => {
                let previous = std::mem::replace(slot, reader);
                Ok(Some(previous.layer().clone()))
            }
            None => {
                self.readers.push(reader);
                Ok(None)
            }
        }
    }

    /// Unregister a layer and release its file handle.
    pub fn remove_layer(&mut self, key: &str) -> Option<LayerDescriptor> {
        let index = self.readers.iter().position(|r| r.layer().key() == key)?;
        let mut reader = self.readers.remove(index);
        reader.close();
        self.state = IteratorState::Uninitialized;
        Some(reader.layer().clone())
    }

    pub fn layer(&self, key: &str) -> Option<&LayerDescriptor> {
        self.readers
            .iter()
            .map(TileBufferedReader::layer)
            .find(|l| l.key() == key)
    }

    /// Registered layers in registration order.
    pub fn layers(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.readers.iter().map(TileBufferedReader::layer)
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn options(&self) -> &IteratorOptions {
        &self.options
    }

    pub fn state(&self) -> IteratorState {
        self.state
    }

    pub fn position(&self) -> &IterationState {
        &self.position
    }

    pub fn row(&self) -> u32 {
        self.position.row
    }

    pub fn col(&self) -> u32 {
        self.position.col
    }

    /// Absolute key of the current tile (`row * columns + col + 1`).
    pub fn key(&self) -> u64 {
        self.grid.tile_key(self.position.row, self.position.col)
    }

    /// Position every layer at the skip offset.
    ///
    /// Files are seeked to the window boundary containing the skip tile. If
    /// that is not the tile itself, one window is read immediately and the
    /// in-window offset is moved to it.
    pub fn rewind(&mut self) -> BilResult<()> {
        let skip = self.position.skip;
        let (row, col) = self.grid.position(skip);
        self.position = IterationState {
            row,
            col,
            skip,
            ..Default::default()
        };

        let result = self.position_readers(skip);
        self.state = match result {
            Ok(()) => IteratorState::Ready,
            Err(_) => IteratorState::Exhausted,
        };
        result?;

        debug!(
            skip,
            row,
            col,
            layers = self.readers.len(),
            window = self.position.window_len,
            "Rewound tile iterator"
        );
        Ok(())
    }

    fn position_readers(&mut self, skip: u64) -> BilResult<()> {
        for reader in &mut self.readers {
            reader.open()?;
            reader.seek_to_tile(skip)?;
        }
        if skip > 0 {
            self.refill_all()?;
            let offset = (skip % self.options.buffer_tiles as u64) as usize;
            self.position.tile_index_in_window = offset;
            for reader in &mut self.readers {
                reader.set_cursor(offset);
            }
        }
        Ok(())
    }

    /// Refill every window and record the new window length.
    fn refill_all(&mut self) -> BilResult<()> {
        let mut counts = Vec::with_capacity(self.readers.len());
        for reader in &mut self.readers {
            counts.push(reader.refill()?);
        }

        let window_len = counts.iter().copied().find(|&n| n > 0).unwrap_or(0);
        if counts.iter().any(|&n| n != window_len) {
            warn!(
                row = self.position.row,
                col = self.position.col,
                expected = window_len,
                counts = ?counts,
                "Layers returned different window lengths"
            );
        }

        self.position.window_len = window_len;
        self.position.tile_index_in_window = 0;
        Ok(())
    }

    /// True while there is a tile under the current position.
    ///
    /// Rewinds on first use and refills the windows when the current one is
    /// used up. End of data in the files and the end of the grid both end
    /// the iteration.
    pub fn has_more(&mut self) -> BilResult<bool> {
        match self.state {
            IteratorState::Exhausted => return Ok(false),
            IteratorState::Uninitialized => self.rewind()?,
            IteratorState::Ready => {}
        }

        if self.position.row >= self.grid.rows() {
            return Ok(self.exhaust());
        }
        if self.position.tile_index_in_window >= self.position.window_len {
            if let Err(e) = self.refill_all() {
                self.state = IteratorState::Exhausted;
                return Err(e);
            }
        }
        if self.position.window_len == 0 {
            return Ok(self.exhaust());
        }
        Ok(true)
    }

    fn exhaust(&mut self) -> bool {
        if self.state != IteratorState::Exhausted {
            debug!(row = self.position.row, col = self.position.col, "Tile iterator exhausted");
        }
        self.state = IteratorState::Exhausted;
        false
    }

    /// Layer values of the current tile, in registration order.
    ///
    /// Layers without data at this tile are absent. Call only after
    /// [`has_more`](Self::has_more) returned true.
    pub fn current(&self) -> LayerValues {
        let offset = self.position.tile_index_in_window;
        let tiles = self
            .readers
            .iter()
            .map(|reader| (reader.layer(), reader.next_value(offset)));
        collect_values(tiles, self.options.policy)
    }

    /// Move to the next tile.
    pub fn advance(&mut self) {
        self.position.tile_index_in_window += 1;
        for reader in &mut self.readers {
            reader.advance();
        }

        self.position.col += 1;
        if self.position.col >= self.grid.columns() {
            self.position.col = 0;
            self.position.row += 1;
        }
    }
}

/// Resolve one tile of every layer, in order, under `policy`.
pub(crate) fn collect_values<'a, I>(tiles: I, policy: NoDataPolicy) -> LayerValues
where
    I: ExactSizeIterator<Item = (&'a LayerDescriptor, Option<&'a TileValue>)>,
{
    let mut values = LayerValues::with_capacity(tiles.len());
    for (i, (layer, tile)) in tiles.enumerate() {
        match tile.and_then(|tile| resolve_tile(layer, tile)) {
            Some(data) => values.push(layer.key(), data),
            None if i == 0 && policy == NoDataPolicy::ShortCircuitOnFirst => break,
            None => {}
        }
    }
    values
}

impl Iterator for MultiFileTileIterator {
    type Item = BilResult<(u64, LayerValues)>;

    /// Yields every tile, including those with an empty record.
    fn next(&mut self) -> Option<Self::Item> {
        match self.has_more() {
            Ok(true) => {
                let item = (self.key(), self.current());
                self.advance();
                Some(Ok(item))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
