//! BIL loader: runs a tile sweep and writes storage documents.
//!
//! The binary wires a [`bil_reader::SweepConfig`] to a [`writer::BatchWriter`];
//! the pieces live here so they can be tested without the CLI.

pub mod document;
pub mod load;
pub mod writer;

pub use document::{GeoPoint, TileDocument};
pub use load::run_sweep;
pub use writer::{BatchWriter, LoadStats};
