use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::open_store;

/// List the platforms a scan can target.
pub(crate) fn run_platforms(db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let platforms = store
        .with_connection(romshelf_db::list_platforms)
        .map_err(|e| CliError::database(format!("Failed to list platforms: {}", e)))?;

    log::info!("{}", "Platforms".if_supports_color(Stdout, |t| t.bold()));
    for platform in platforms {
        log::info!(
            "  {:<10} {}",
            platform.id.if_supports_color(Stdout, |t| t.cyan()),
            platform.name,
        );
    }
    Ok(())
}
