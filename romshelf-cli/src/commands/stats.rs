use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::open_store;

pub(crate) fn run_stats(db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let stats = store
        .with_connection(romshelf_db::catalog_stats)
        .map_err(|e| CliError::database(format!("Failed to query catalog stats: {}", e)))?;

    log::info!(
        "{}",
        "Catalog Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    crate::log_blank();
    log::info!("  Platforms:        {:>8}", stats.platforms);
    log::info!("  Entries:          {:>8}", stats.games);
    log::info!("  File locations:   {:>8}", stats.file_locations);
    log::info!("  Unhashed files:   {:>8}", stats.unhashed_files);
    log::info!("  Missing metadata: {:>8}", stats.games_missing_metadata);
    Ok(())
}
