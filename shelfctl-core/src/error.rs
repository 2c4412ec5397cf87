/// Structured error types for shelfctl-core.
///
/// Binary crates (shelfctl-cli) wrap these with `anyhow` context,
/// library consumers match on the variants.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for shelfctl-core operations
#[derive(Error, Debug)]
pub enum ShelfError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file could not be parsed
    #[error("Invalid config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config could not be serialized
    #[error("Failed to serialize config: {source}")]
    ConfigSerialize {
        #[from]
        source: toml::ser::Error,
    },

    /// Config file does not exist
    #[error("Config not found at {path:?}\n\nRun: shelfctl config init")]
    ConfigMissing { path: PathBuf },

    /// Configuration value is invalid
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for shelfctl-core operations
pub type Result<T> = std::result::Result<T, ShelfError>;

impl ShelfError {
    /// Create a config parse error
    pub fn config_parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
