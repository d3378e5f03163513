//! Writers for small synthetic BIL files.
//!
//! Used by unit tests here and by the integration tests of dependent crates.

use std::fs;
use std::path::{Path, PathBuf};

use bil_common::{Encoding, LayerDescriptor, Translation};

/// Encode `values` back to back with `encoding`.
///
/// Panics if a value does not fit the encoding.
pub fn encode_values(encoding: Encoding, values: &[i64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * encoding.byte_width());
    for &value in values {
        assert!(
            encoding.encode_into(value, &mut bytes),
            "value {} does not fit {}",
            value,
            encoding
        );
    }
    bytes
}

/// Write `values` to `dir/name` and return the path.
///
/// Multi-band data must already be interleaved per tile.
pub fn write_bil(dir: &Path, name: &str, encoding: Encoding, values: &[i64]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, encode_values(encoding, values)).expect("write test BIL file");
    path
}

/// Write `dir/<key>.bil` and register it as an untranslated layer.
pub fn register_bil(
    dir: &Path,
    key: &str,
    encoding: Encoding,
    bands: u32,
    no_data: i64,
    values: &[i64],
) -> LayerDescriptor {
    let path = write_bil(dir, &format!("{}.bil", key), encoding, values);
    LayerDescriptor::new(key, path, bands, encoding, no_data, None).expect("register test layer")
}

/// Like [`register_bil`] with a translation table attached.
pub fn register_translated(
    dir: &Path,
    key: &str,
    encoding: Encoding,
    no_data: i64,
    values: &[i64],
    translation: Translation,
) -> LayerDescriptor {
    let path = write_bil(dir, &format!("{}.bil", key), encoding, values);
    LayerDescriptor::new(key, path, 1, encoding, no_data, Some(translation))
        .expect("register test layer")
}
