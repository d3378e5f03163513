//! Lockstep reader for gridded raster layers stored as headerless BIL files.
//!
//! Several layer files describing the same grid are read in parallel, one
//! bounded window at a time, and combined into one record per tile:
//!
//! ```text
//! SweepConfig ─► MultiFileTileIterator ─► ValidTileFilter ─► TileRecord
//!                  │ TileBufferedReader (one per layer)
//!                  └ GridGeometry (coordinates of accepted tiles)
//! ```
//!
//! Memory use is bounded by `buffer_tiles × layers × bands × byte width`,
//! independent of the grid size. A sweep can resume at any absolute tile
//! offset through [`IteratorOptions::skip`].

pub mod config;
pub mod filter;
pub mod iterator;
pub mod reader;
pub mod record;
pub mod sampler;
pub mod testdata;

pub use config::{LayerConfig, SweepConfig};
pub use filter::ValidTileFilter;
pub use iterator::{
    IterationState, IteratorOptions, IteratorState, MultiFileTileIterator, NoDataPolicy,
    DEFAULT_BUFFER_TILES,
};
pub use reader::{TileBufferedReader, TileValue, TileWindow};
pub use record::{LayerValues, TileData, TileLocation, TileRecord};
pub use sampler::PointSampler;
