//! Layer descriptors: one binary file plus the metadata needed to decode it.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoding::Encoding;
use crate::error::{BilError, BilResult};

/// A value stored in a tile record.
///
/// Raw band elements are always integers; translation tables may replace
/// them with text identifiers or other numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for LayerValue {
    fn from(v: i64) -> Self {
        LayerValue::Integer(v)
    }
}

impl From<f64> for LayerValue {
    fn from(v: f64) -> Self {
        LayerValue::Float(v)
    }
}

impl From<&str> for LayerValue {
    fn from(v: &str) -> Self {
        LayerValue::Text(v.to_string())
    }
}

impl From<String> for LayerValue {
    fn from(v: String) -> Self {
        LayerValue::Text(v)
    }
}

impl fmt::Display for LayerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerValue::Integer(v) => write!(f, "{}", v),
            LayerValue::Float(v) => write!(f, "{}", v),
            LayerValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// What happens to a raw value that has no entry in the translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPolicy {
    /// The band contributes nothing, as if it were no-data.
    #[default]
    Drop,
    /// The raw value is kept untranslated.
    PassThrough,
}

/// Raw value → replacement lookup applied after the no-data check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub table: HashMap<i64, LayerValue>,
    #[serde(default)]
    pub unmapped: UnmappedPolicy,
}

impl Translation {
    pub fn new(table: HashMap<i64, LayerValue>) -> Self {
        Self {
            table,
            unmapped: UnmappedPolicy::Drop,
        }
    }

    pub fn with_policy(mut self, unmapped: UnmappedPolicy) -> Self {
        self.unmapped = unmapped;
        self
    }

    /// Translate a raw value; `None` means the value is dropped.
    pub fn apply(&self, raw: i64) -> Option<LayerValue> {
        match self.table.get(&raw) {
            Some(value) => Some(value.clone()),
            None => match self.unmapped {
                UnmappedPolicy::Drop => None,
                UnmappedPolicy::PassThrough => Some(LayerValue::Integer(raw)),
            },
        }
    }
}

impl FromIterator<(i64, LayerValue)> for Translation {
    fn from_iter<I: IntoIterator<Item = (i64, LayerValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Immutable description of one registered raster file.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    key: String,
    path: PathBuf,
    bands: u32,
    encoding: Encoding,
    no_data: i64,
    translation: Option<Translation>,
}

impl LayerDescriptor {
    /// Validate and register a layer.
    ///
    /// The file must exist and be readable; its path is stored in canonical
    /// form.
    pub fn new(
        key: impl Into<String>,
        path: impl AsRef<Path>,
        bands: u32,
        encoding: Encoding,
        no_data: i64,
        translation: Option<Translation>,
    ) -> BilResult<Self> {
        let key = key.into();
        let path = path.as_ref();

        if key.is_empty() {
            return Err(BilError::registration(key, "layer key must not be empty"));
        }
        if bands == 0 {
            return Err(BilError::registration(key, "band count must be >= 1"));
        }

        let metadata = fs::metadata(path).map_err(|_| {
            BilError::registration(
                &key,
                format!("file does not exist [{}]", path.display()),
            )
        })?;
        if !metadata.is_file() {
            return Err(BilError::registration(
                &key,
                format!("not a regular file [{}]", path.display()),
            ));
        }
        File::open(path).map_err(|_| {
            BilError::registration(
                &key,
                format!("file is not readable [{}]", path.display()),
            )
        })?;
        let path = fs::canonicalize(path).map_err(|e| BilError::io(path, e))?;

        debug!(
            layer = %key,
            path = %path.display(),
            bands,
            encoding = %encoding,
            no_data,
            translated = translation.is_some(),
            "Registered layer"
        );

        Ok(Self {
            key,
            path,
            bands,
            encoding,
            no_data,
            translation,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Canonical path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bands(&self) -> u32 {
        self.bands
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn no_data(&self) -> i64 {
        self.no_data
    }

    pub fn translation(&self) -> Option<&Translation> {
        self.translation.as_ref()
    }

    /// Bytes occupied by one tile (all bands).
    pub fn tile_bytes(&self) -> usize {
        self.bands as usize * self.encoding.byte_width()
    }

    /// Resolve one raw band value into its record value.
    ///
    /// The no-data comparison uses the raw value; translation only applies
    /// to values that pass it.
    pub fn resolve(&self, raw: i64) -> Option<LayerValue> {
        if raw == self.no_data {
            return None;
        }
        match &self.translation {
            Some(translation) => translation.apply(raw),
            None => Some(LayerValue::Integer(raw)),
        }
    }
}

/// Registered layers in registration order, unique by key.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<LayerDescriptor>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer, replacing any layer with the same key in place.
    ///
    /// Returns the replaced descriptor.
    pub fn set(&mut self, layer: LayerDescriptor) -> Option<LayerDescriptor> {
        match self.layers.iter_mut().find(|l| l.key == layer.key) {
            Some(slot) => Some(std::mem::replace(slot, layer)),
            None => {
                self.layers.push(layer);
                None
            }
        }
    }

    /// Unregister a layer, returning it if it was present.
    pub fn remove(&mut self, key: &str) -> Option<LayerDescriptor> {
        let index = self.layers.iter().position(|l| l.key == key)?;
        Some(self.layers.remove(index))
    }

    pub fn get(&self, key: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| l.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.layers.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl FromIterator<LayerDescriptor> for LayerRegistry {
    fn from_iter<I: IntoIterator<Item = LayerDescriptor>>(iter: I) -> Self {
        let mut registry = LayerRegistry::new();
        for layer in iter {
            registry.set(layer);
        }
        registry
    }
}
