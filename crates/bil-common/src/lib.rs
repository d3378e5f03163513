//! Common types shared by the BIL tile reader and loader.
//!
//! - [`grid`]: grid specification and tile geometry (decimal/DMS coordinates)
//! - [`encoding`]: band element encodings of headerless raster files
//! - [`layer`]: layer descriptors, translation tables and the layer registry
//! - [`error`]: the error taxonomy used across the workspace

pub mod bbox;
pub mod encoding;
pub mod error;
pub mod grid;
pub mod layer;

pub use bbox::{BoundingBox, TileBounds, TileCorners};
pub use encoding::Encoding;
pub use error::{BilError, BilResult};
pub use grid::{grids, Axis, Degrees, GridGeometry, GridSpec, SECONDS_PER_DEGREE};
pub use layer::{LayerDescriptor, LayerRegistry, LayerValue, Translation, UnmappedPolicy};
