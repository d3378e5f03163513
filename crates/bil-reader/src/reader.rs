//! Buffered tile reader for a single layer file.
//!
//! Each reader owns one file handle and one decoded window of at most
//! `capacity` tiles. The window is refilled by reading a fixed chunk of
//! `capacity * bands * byte_width` bytes; a short read at end-of-file
//! simply decodes fewer tiles, and an empty window signals end-of-stream.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use bil_common::{BilError, BilResult, LayerDescriptor};
use tracing::{debug, trace, warn};

/// Decoded band values of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileValue {
    /// Single-band layers.
    Scalar(i64),
    /// Multi-band layers, one value per band.
    Bands(Vec<i64>),
}

impl TileValue {
    /// Band values as a slice (one element for scalars).
    pub fn bands(&self) -> &[i64] {
        match self {
            TileValue::Scalar(v) => std::slice::from_ref(v),
            TileValue::Bands(v) => v,
        }
    }
}

/// The decoded in-memory window of one layer.
#[derive(Debug, Clone)]
pub struct TileWindow {
    tiles: Vec<TileValue>,
    cursor: usize,
    capacity: usize,
}

impl TileWindow {
    fn new(capacity: usize) -> Self {
        Self {
            tiles: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Number of decoded tiles currently held.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once every decoded tile has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.tiles.len()
    }

    pub fn get(&self, offset: usize) -> Option<&TileValue> {
        self.tiles.get(offset)
    }

    fn clear(&mut self) {
        self.tiles.clear();
        self.cursor = 0;
    }
}

/// Reads one layer's file through a bounded decode window.
#[derive(Debug)]
pub struct TileBufferedReader {
    layer: LayerDescriptor,
    file: Option<File>,
    window: TileWindow,
    chunk: Vec<u8>,
}

impl TileBufferedReader {
    /// Create a reader holding at most `capacity` tiles in memory.
    ///
    /// The file is not opened until [`open`](Self::open) is called.
    pub fn new(layer: LayerDescriptor, capacity: usize) -> BilResult<Self> {
        if capacity == 0 {
            return Err(BilError::config("buffer capacity must be > 0 tiles"));
        }
        let chunk = Vec::with_capacity(capacity * layer.tile_bytes());
        Ok(Self {
            layer,
            file: None,
            window: TileWindow::new(capacity),
            chunk,
        })
    }

    pub fn layer(&self) -> &LayerDescriptor {
        &self.layer
    }

    pub fn window(&self) -> &TileWindow {
        &self.window
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Bytes read by one window refill.
    pub fn chunk_bytes(&self) -> usize {
        self.window.capacity * self.layer.tile_bytes()
    }

    /// Open the file for reading.
    ///
    /// If it is already open this rewinds to the start and clears the
    /// window instead.
    pub fn open(&mut self) -> BilResult<()> {
        match self.file.as_mut() {
            Some(file) => {
                file.seek(SeekFrom::Start(0))
                    .map_err(|e| BilError::io(self.layer.path(), e))?;
            }
            None => {
                let file =
                    File::open(self.layer.path()).map_err(|e| BilError::io(self.layer.path(), e))?;
                debug!(layer = %self.layer.key(), path = %self.layer.path().display(), "Opened layer file");
                self.file = Some(file);
            }
        }
        self.window.clear();
        Ok(())
    }

    /// Release the file handle and drop the window.
    pub fn close(&mut self) {
        self.file = None;
        self.window.clear();
    }

    fn file_mut(&mut self) -> BilResult<&mut File> {
        if self.file.is_none() {
            self.open()?;
        }
        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(BilError::io(
                self.layer.path(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "layer file is not open"),
            )),
        }
    }

    /// Position the file at the window boundary containing `absolute_index`.
    ///
    /// The seek lands on a multiple of the buffer capacity, not on the tile
    /// itself; callers correct the in-window cursor after the next fill.
    /// Returns the byte offset.
    pub fn seek_to_tile(&mut self, absolute_index: u64) -> BilResult<u64> {
        let capacity = self.window.capacity as u64;
        let offset = (absolute_index / capacity) * capacity * self.layer.tile_bytes() as u64;

        let path = self.layer.path().to_path_buf();
        self.file_mut()?
            .seek(SeekFrom::Start(offset))
            .map_err(|e| BilError::io(&path, e))?;
        self.window.clear();

        debug!(layer = %self.layer.key(), tile = absolute_index, offset, "Seeked layer file");
        Ok(offset)
    }

    /// Refill the window if it is exhausted.
    ///
    /// Returns the number of tiles in the window; zero means end-of-stream.
    pub fn fill(&mut self) -> BilResult<usize> {
        if !self.window.is_exhausted() {
            return Ok(self.window.len());
        }
        self.refill()
    }

    /// Read and decode the next chunk regardless of the window state.
    pub fn refill(&mut self) -> BilResult<usize> {
        let wanted = self.chunk_bytes() as u64;
        let path = self.layer.path().to_path_buf();

        let mut chunk = std::mem::take(&mut self.chunk);
        chunk.clear();
        let read = self
            .file_mut()
            .and_then(|file| {
                file.take(wanted)
                    .read_to_end(&mut chunk)
                    .map_err(|e| BilError::io(&path, e))
            });
        let result = read.map(|_| {
            self.window.clear();
            let trailing = decode_tiles(&self.layer, &chunk, &mut self.window.tiles);
            if trailing > 0 {
                warn!(
                    layer = %self.layer.key(),
                    bytes = trailing,
                    "Discarded incomplete tile at end of file"
                );
            }
            trace!(layer = %self.layer.key(), tiles = self.window.len(), "Filled window");
            self.window.len()
        });
        self.chunk = chunk;
        result
    }

    /// The tile at `offset` within the current window.
    pub fn next_value(&self, offset: usize) -> Option<&TileValue> {
        self.window.get(offset)
    }

    /// The tile under the window cursor.
    pub fn current(&self) -> Option<&TileValue> {
        self.window.get(self.window.cursor)
    }

    /// Move the window cursor forward by one tile (stops at the end).
    pub fn advance(&mut self) {
        if self.window.cursor < self.window.tiles.len() {
            self.window.cursor += 1;
        }
    }

    /// Place the window cursor, clamped to the window length.
    pub fn set_cursor(&mut self, offset: usize) {
        self.window.cursor = offset.min(self.window.tiles.len());
    }

    /// Read one tile by absolute index without going through the window.
    ///
    /// The stream position moves, so the window is cleared; call
    /// [`seek_to_tile`](Self::seek_to_tile) before streaming again.
    /// Returns `None` past the end of the file.
    pub fn read_tile_at(&mut self, absolute_index: u64) -> BilResult<Option<TileValue>> {
        let tile_bytes = self.layer.tile_bytes();
        let offset = absolute_index * tile_bytes as u64;
        let path = self.layer.path().to_path_buf();

        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| BilError::io(&path, e))?;
        let mut buf = Vec::with_capacity(tile_bytes);
        file.take(tile_bytes as u64)
            .read_to_end(&mut buf)
            .map_err(|e| BilError::io(&path, e))?;
        self.window.clear();

        if buf.len() < tile_bytes {
            return Ok(None);
        }
        Ok(decode_tile(&self.layer, &buf))
    }
}

/// Decode whole tiles from `bytes` into `out`.
///
/// Returns the number of trailing bytes that did not form a complete tile.
pub fn decode_tiles(layer: &LayerDescriptor, bytes: &[u8], out: &mut Vec<TileValue>) -> usize {
    let tiles = bytes.chunks_exact(layer.tile_bytes());
    let trailing = tiles.remainder().len();
    out.extend(tiles.filter_map(|tile| decode_tile(layer, tile)));
    trailing
}

/// Decode one tile's band tuple.
pub fn decode_tile(layer: &LayerDescriptor, tile: &[u8]) -> Option<TileValue> {
    let encoding = layer.encoding();
    if layer.bands() == 1 {
        return encoding.decode(tile).map(TileValue::Scalar);
    }
    let bands = tile
        .chunks_exact(encoding.byte_width())
        .map(|band| encoding.decode(band))
        .collect::<Option<Vec<_>>>()?;
    Some(TileValue::Bands(bands))
}

/// Encode a tile's band values with the layer's encoding.
///
/// Returns `None` if a value does not fit the encoding or the band count
/// does not match.
pub fn encode_tile(layer: &LayerDescriptor, tile: &TileValue) -> Option<Vec<u8>> {
    let values = tile.bands();
    if values.len() != layer.bands() as usize {
        return None;
    }
    let mut out = Vec::with_capacity(layer.tile_bytes());
    for &value in values {
        if !layer.encoding().encode_into(value, &mut out) {
            return None;
        }
    }
    Some(out)
}
