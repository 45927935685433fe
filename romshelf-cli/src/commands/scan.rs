use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use romshelf_import::{RescanPolicy, ScanOptions, ScanProgress, ScanRequest, ScanResult};
use romshelf_lib::Settings;

use crate::CliError;
use crate::spinner::Spinner;

use super::{open_store, print_json};

pub(crate) struct ScanArgs {
    pub directory: PathBuf,
    pub platform: String,
    pub server: Option<String>,
    pub recursive: bool,
    pub skip_existing: bool,
    pub json: bool,
}

struct CliScanProgress {
    spinner: Spinner,
}

impl ScanProgress for CliScanProgress {
    fn on_file(&self, current: usize, total: usize, filename: &str) {
        self.spinner
            .set_message(format!("[{}/{}] {}", current, total, filename));
    }

    fn on_new_entry(&self, title: &str) {
        self.spinner.suspend(|| {
            log::info!(
                "  {} {}",
                "+".if_supports_color(Stdout, |t| t.green()),
                title.if_supports_color(Stdout, |t| t.bold()),
            );
        });
    }

    fn on_error(&self, filename: &str, error: &str) {
        self.spinner.suspend(|| {
            log::warn!(
                "  {} {}: {}",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                filename,
                error,
            );
        });
    }

    fn on_complete(&self, _result: &ScanResult) {
        self.spinner.finish();
    }
}

/// Scan a folder into the catalog and print a summary (or the JSON result).
pub(crate) fn run_scan(
    settings: &Settings,
    db_path: &Path,
    args: ScanArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;

    let request = ScanRequest {
        directory_path: args.directory,
        server_location: args
            .server
            .unwrap_or_else(|| settings.scan.server_location.clone()),
        platform_id: args.platform,
        recursive: args.recursive,
    };
    let options = ScanOptions {
        extensions: settings.extension_set(),
        rescan: if args.skip_existing {
            RescanPolicy::SkipExisting
        } else {
            RescanPolicy::Append
        },
    };

    if !args.json {
        log::info!(
            "{}",
            format!(
                "Scanning {} ({}) into {}",
                request.directory_path.display(),
                request.platform_id,
                db_path.display()
            )
            .if_supports_color(Stdout, |t| t.bold()),
        );
    }

    // JSON mode keeps the terminal clean for the document on stdout.
    let progress = CliScanProgress {
        spinner: Spinner::new(quiet || args.json),
    };
    let result = romshelf_import::scan_directory(&store, &request, &options, Some(&progress));
    progress.spinner.finish();
    let result = result?;

    if args.json {
        return print_json(&result);
    }

    crate::log_blank();
    log::info!("{}", "Scan complete".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Files found:   {:>6}", result.files_found.len());
    log::info!("  New entries:   {:>6}", result.games_added.len());
    if result.skipped_existing > 0 {
        log::info!("  Already known: {:>6}", result.skipped_existing);
    }
    if !result.errors.is_empty() {
        log::info!(
            "  Errors:        {:>6}",
            result
                .errors
                .len()
                .if_supports_color(Stdout, |t| t.red()),
        );
    }
    Ok(())
}
