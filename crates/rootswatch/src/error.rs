//! Error types for palette derivation.
//!
//! Failures are split by concern so callers can tell a broken configuration
//! (fatal, fix and restart) from a broken stylesheet (fatal to one rebuild,
//! possibly served from cache) from a flaky cache backend (never surfaced).

use std::path::PathBuf;

use thiserror::Error;

/// A syntax failure found while scanning stylesheet text.
///
/// Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ScanError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ScanError {
    pub(crate) fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Missing or invalid configuration, raised when a [`PaletteSource`] is built.
///
/// [`PaletteSource`]: crate::PaletteSource
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No stylesheet path was given.
    #[error("no stylesheet path configured")]
    MissingStylesheet,

    /// The configured stylesheet does not exist or cannot be resolved.
    #[error("stylesheet not found: {}", path.display())]
    StylesheetNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be read.
    #[error("cannot read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cache lifetime of zero would expire every record on write.
    #[error("cache lifetime must be at least one second")]
    ZeroLifetime,

    /// The YAML configuration document could not be read.
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A cache backend failure.
///
/// The cache layer logs these and degrades to a miss; they never reach
/// [`PaletteSource`](crate::PaletteSource) callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The backend refused the operation (used by test doubles and remote stores).
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for palette operations.
#[derive(Debug, Error)]
pub enum PaletteError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The stylesheet is not valid CSS.
    #[error("failed to parse stylesheet {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    /// The stylesheet could not be read at rebuild time.
    #[error("failed to read stylesheet {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for palette operations.
pub type Result<T> = std::result::Result<T, PaletteError>;
