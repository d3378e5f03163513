//! Sweep configuration: grid, buffering, resume offset and layers.
//!
//! Loaded from YAML or JSON. Layer paths may use `~` and `${VAR}`, which are
//! expanded when the layer is registered.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bil_common::{
    grids, BilError, BilResult, Encoding, GridSpec, LayerDescriptor, LayerRegistry, LayerValue,
    Translation, UnmappedPolicy,
};

use crate::filter::ValidTileFilter;
use crate::iterator::{IteratorOptions, MultiFileTileIterator, NoDataPolicy, DEFAULT_BUFFER_TILES};
use crate::sampler::PointSampler;

/// Default no-data sentinel of WorldClim layers.
pub const DEFAULT_NO_DATA: i64 = -9999;

/// Configuration of one sweep over a set of layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "grids::worldclim_30s")]
    pub grid: GridSpec,

    /// Tiles held in memory per layer.
    #[serde(default = "default_buffer_tiles")]
    pub buffer_tiles: usize,

    /// Absolute tile offset to resume from.
    #[serde(default)]
    pub skip: u64,

    #[serde(default)]
    pub no_data_policy: NoDataPolicy,

    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

/// One layer entry of a [`SweepConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub key: String,
    pub path: String,

    #[serde(default = "default_bands")]
    pub bands: u32,

    /// Pack code (`s`, `C`, `N`, ...) or long name, parsed at registration.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default = "default_no_data")]
    pub no_data: i64,

    /// Raw value to replacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<HashMap<i64, LayerValue>>,

    /// Fate of raw values missing from `translation`.
    #[serde(default)]
    pub unmapped: UnmappedPolicy,
}

fn default_buffer_tiles() -> usize {
    DEFAULT_BUFFER_TILES
}

fn default_bands() -> u32 {
    1
}

fn default_encoding() -> String {
    Encoding::SignedShort.code().to_string()
}

fn default_no_data() -> i64 {
    DEFAULT_NO_DATA
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            grid: grids::worldclim_30s(),
            buffer_tiles: DEFAULT_BUFFER_TILES,
            skip: 0,
            no_data_policy: NoDataPolicy::default(),
            layers: Vec::new(),
        }
    }
}

impl SweepConfig {
    pub fn from_yaml_str(content: &str) -> BilResult<Self> {
        serde_yaml::from_str(content).map_err(|e| BilError::ConfigParse(format!("YAML error: {}", e)))
    }

    pub fn from_json_str(content: &str) -> BilResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a YAML config file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> BilResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| BilError::io(path, e))?;
        let config = Self::from_yaml_str(&content)?;
        info!(
            path = %path.display(),
            layers = config.layers.len(),
            "Loaded sweep configuration"
        );
        Ok(config)
    }

    /// Apply overrides from `BIL_BUFFER_TILES`, `BIL_SKIP` and
    /// `BIL_NO_DATA_POLICY`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BIL_BUFFER_TILES") {
            match val.parse() {
                Ok(tiles) => self.buffer_tiles = tiles,
                Err(_) => warn!(value = %val, "Ignoring invalid BIL_BUFFER_TILES"),
            }
        }

        if let Some(val) = lookup("BIL_SKIP") {
            match val.parse() {
                Ok(skip) => self.skip = skip,
                Err(_) => warn!(value = %val, "Ignoring invalid BIL_SKIP"),
            }
        }

        if let Some(val) = lookup("BIL_NO_DATA_POLICY") {
            match val.to_lowercase().as_str() {
                "check_all_layers" | "all" => self.no_data_policy = NoDataPolicy::CheckAllLayers,
                "short_circuit_on_first" | "first" => {
                    self.no_data_policy = NoDataPolicy::ShortCircuitOnFirst
                }
                _ => warn!(value = %val, "Ignoring invalid BIL_NO_DATA_POLICY"),
            }
        }
    }

    /// Check the settings that do not touch the filesystem.
    pub fn validate(&self) -> BilResult<()> {
        if self.buffer_tiles == 0 {
            return Err(BilError::config("buffer_tiles must be > 0"));
        }
        if self.skip >= self.grid.tile_count() {
            return Err(BilError::config(format!(
                "skip {} is past the last tile ({} tiles)",
                self.skip,
                self.grid.tile_count()
            )));
        }
        if self.layers.is_empty() {
            return Err(BilError::config("at least one layer is required"));
        }

        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.key.as_str()) {
                return Err(BilError::registration(&layer.key, "duplicate layer key"));
            }
            if layer.bands == 0 {
                return Err(BilError::registration(&layer.key, "band count must be >= 1"));
            }
            layer.encoding()?;
        }
        Ok(())
    }

    pub fn iterator_options(&self) -> IteratorOptions {
        IteratorOptions {
            buffer_tiles: self.buffer_tiles,
            skip: self.skip,
            policy: self.no_data_policy,
        }
    }

    /// Register every layer, in order.
    pub fn registry(&self) -> BilResult<LayerRegistry> {
        self.layers.iter().map(LayerConfig::register).collect()
    }

    /// Validate, register the layers and build an iterator over them.
    pub fn build_iterator(&self) -> BilResult<MultiFileTileIterator> {
        self.validate()?;
        let mut iter = MultiFileTileIterator::new(self.grid, self.iterator_options())?;
        for layer in self.registry()?.iter() {
            iter.set_layer(layer.clone())?;
        }
        Ok(iter)
    }

    pub fn build_filter(&self) -> BilResult<ValidTileFilter> {
        Ok(ValidTileFilter::new(self.build_iterator()?))
    }

    pub fn build_sampler(&self) -> BilResult<PointSampler> {
        self.validate()?;
        let mut sampler = PointSampler::new(self.grid, self.no_data_policy);
        for layer in self.registry()?.iter() {
            sampler.set_layer(layer.clone())?;
        }
        Ok(sampler)
    }
}

impl LayerConfig {
    pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            bands: default_bands(),
            encoding: default_encoding(),
            no_data: DEFAULT_NO_DATA,
            translation: None,
            unmapped: UnmappedPolicy::default(),
        }
    }

    /// Path with `~` and environment variables expanded.
    pub fn expanded_path(&self) -> BilResult<PathBuf> {
        let expanded = shellexpand::full(&self.path)
            .map_err(|e| BilError::registration(&self.key, format!("cannot expand path: {}", e)))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }

    /// Parsed band encoding.
    pub fn encoding(&self) -> BilResult<Encoding> {
        self.encoding.parse()
    }

    /// Set the band encoding from a parsed value.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding.code().to_string();
        self
    }

    pub fn translation(&self) -> Option<Translation> {
        self.translation
            .as_ref()
            .map(|table| Translation::new(table.clone()).with_policy(self.unmapped))
    }

    /// Validate the file and build its descriptor.
    pub fn register(&self) -> BilResult<LayerDescriptor> {
        let encoding = self.encoding()?;
        LayerDescriptor::new(
            self.key.as_str(),
            self.expanded_path()?,
            self.bands,
            encoding,
            self.no_data,
            self.translation(),
        )
    }
}
