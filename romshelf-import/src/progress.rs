//! Scan progress reporting.

use crate::scan_import::ScanResult;

/// Trait for receiving scan progress updates.
pub trait ScanProgress {
    /// Called before each admitted file is hashed.
    fn on_file(&self, current: usize, total: usize, filename: &str);

    /// Called when a file creates a new catalog entry.
    fn on_new_entry(&self, title: &str);

    /// Called for every per-file problem.
    fn on_error(&self, filename: &str, error: &str);

    /// Called once the scan is complete.
    fn on_complete(&self, result: &ScanResult);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentScanProgress;

impl ScanProgress for SilentScanProgress {
    fn on_file(&self, _current: usize, _total: usize, _filename: &str) {}
    fn on_new_entry(&self, _title: &str) {}
    fn on_error(&self, _filename: &str, _error: &str) {}
    fn on_complete(&self, _result: &ScanResult) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogScanProgress;

impl ScanProgress for LogScanProgress {
    fn on_file(&self, current: usize, total: usize, filename: &str) {
        if current.is_multiple_of(100) || current == total {
            log::info!("  [{}/{}] {}", current, total, filename);
        }
    }

    fn on_new_entry(&self, title: &str) {
        log::debug!("  New entry: {}", title);
    }

    fn on_error(&self, filename: &str, error: &str) {
        log::warn!("  {}: {}", filename, error);
    }

    fn on_complete(&self, result: &ScanResult) {
        log::info!(
            "Scan complete: {} files, {} new entries, {} errors",
            result.files_found.len(),
            result.games_added.len(),
            result.errors.len()
        );
    }
}
