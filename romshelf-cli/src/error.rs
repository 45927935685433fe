use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database open or query failed
    #[error("Database error: {0}")]
    Database(String),

    #[error("Settings error: {0}")]
    Settings(#[from] romshelf_lib::SettingsError),

    #[error("Scan failed: {0}")]
    Scan(#[from] romshelf_import::ScanError),

    #[error("Enrichment failed: {0}")]
    Job(#[from] romshelf_import::JobError),

    /// Missing or unusable provider credentials
    #[error("Config error: {0}")]
    Config(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub(crate) fn database(msg: impl std::fmt::Display) -> Self {
        Self::Database(msg.to_string())
    }

    pub(crate) fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }

    pub(crate) fn runtime(msg: impl std::fmt::Display) -> Self {
        Self::Runtime(msg.to_string())
    }
}
