use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use romshelf_lib::util::format_bytes;

use crate::CliError;

use super::{open_store, print_json};

/// Report every content hash shared by two or more file locations.
pub(crate) fn run_duplicates(db_path: &Path, json: bool) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let report = romshelf_import::find_duplicates(&store)
        .map_err(|e| CliError::database(format!("Failed to read file locations: {}", e)))?;

    if json {
        return print_json(&report);
    }

    if report.count == 0 {
        log::info!("No duplicate files found.");
        return Ok(());
    }

    let mut wasted = 0u64;
    for group in &report.duplicates {
        let size = group.files.first().map(|f| f.file_size).unwrap_or(0);
        wasted += size * (group.files.len() as u64 - 1);

        log::info!(
            "{} ({} copies, {} each)",
            group.hash.if_supports_color(Stdout, |t| t.bold()),
            group.files.len(),
            format_bytes(size),
        );
        for file in &group.files {
            log::info!(
                "  {} {}",
                format!("[{}]", file.server_location).if_supports_color(Stdout, |t| t.dimmed()),
                file.file_path,
            );
        }
    }

    crate::log_blank();
    log::info!(
        "{} duplicate groups, {} reclaimable",
        report.count,
        format_bytes(wasted).if_supports_color(Stdout, |t| t.yellow()),
    );
    Ok(())
}
