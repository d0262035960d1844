use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by cachet operations.
#[derive(Debug, Error)]
pub enum CachetError {
    #[error("Failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{path}` already carries the hash `{hash}`")]
    AlreadyHashed { path: PathBuf, hash: String },

    #[error("Unsupported hash algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Glob expansion failed: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Failed to parse options file `{path}`: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CachetError {
    /// Wraps an io::Error with the path the operation targeted.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CachetError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience Result type for cachet operations.
pub type Result<T> = std::result::Result<T, CachetError>;
