pub(crate) mod config;
pub(crate) mod duplicates;
pub(crate) mod enrich;
pub(crate) mod platforms;
pub(crate) mod scan;
pub(crate) mod stats;

use std::path::Path;

use romshelf_db::SqliteCatalog;

use crate::CliError;

/// Open (creating if needed) the catalog database.
pub(crate) fn open_store(db_path: &Path) -> Result<SqliteCatalog, CliError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    log::debug!("Opening catalog {}", db_path.display());
    SqliteCatalog::open(db_path)
        .map_err(|e| CliError::database(format!("Failed to open {}: {}", db_path.display(), e)))
}

/// Write `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
