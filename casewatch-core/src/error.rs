/// Structured error types for casewatch-core.
///
/// The binary (casewatch-cli) wraps these in `anyhow`; the server maps them
/// onto its own error types at startup.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for casewatch-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reading a config or fixture file failed
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML for the expected shape
    #[error("Invalid config file {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Fixture JSON could not be parsed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Fixture parsed but is internally inconsistent
    #[error("Invalid fallback fixture: {reason}")]
    Fixture { reason: String },

    /// Configuration value could not be applied
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for casewatch-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn fixture(reason: impl Into<String>) -> Self {
        Self::Fixture {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
