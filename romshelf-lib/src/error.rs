use std::path::PathBuf;

use thiserror::Error;

/// Errors from hashing a single file. Never fatal to a scan.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that prevent a directory walk from starting.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Cannot access {path}: {source}")]
    Access {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
