//! Error types for BIL tile processing.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using BilError.
pub type BilResult<T> = Result<T, BilError>;

/// Primary error type for grid, layer and tile operations.
///
/// Every variant is fatal to the operation in progress. End-of-stream is
/// never reported through this type.
#[derive(Debug, Error)]
pub enum BilError {
    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    // === Registration Errors ===
    #[error("Cannot register layer '{key}': {reason}")]
    LayerRegistration { key: String, reason: String },

    #[error("Unsupported band encoding: [{0}]")]
    UnsupportedEncoding(String),

    // === I/O Errors ===
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BilError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a LayerRegistration error.
    pub fn registration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LayerRegistration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an Io error bound to the file that caused it.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for configuration problems (grid or config file).
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::ConfigParse(_))
    }

    /// True for problems detected while registering a layer.
    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            Self::LayerRegistration { .. } | Self::UnsupportedEncoding(_)
        )
    }
}

impl From<serde_json::Error> for BilError {
    fn from(err: serde_json::Error) -> Self {
        BilError::ConfigParse(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(BilError::config("bad").is_config());
        assert!(BilError::registration("alt", "missing").is_registration());
        assert!(BilError::UnsupportedEncoding("x".into()).is_registration());

        let io = BilError::io(
            "/tmp/alt.bil",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(!io.is_config());
        assert!(io.to_string().contains("/tmp/alt.bil"));
    }
}
