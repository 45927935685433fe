//! Scan a directory tree into the catalog.
//!
//! Each admitted file is hashed, its filename normalized into a title, and
//! the (title, platform) pair matched against the catalog: an existing entry
//! gains a file location, otherwise a bare entry is created first. Problems
//! with individual files are collected, never fatal.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use romshelf_catalog::normalize::{is_rom_extension, normalize_title_with};
use romshelf_catalog::types::*;
use romshelf_db::{CatalogStore, OperationError};
use romshelf_lib::settings::DEFAULT_EXTENSIONS;
use romshelf_lib::{WalkError, extension_set, hash_file, walk_roms};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progress::ScanProgress;

/// Failures that stop a scan before any file is processed.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),
}

/// What to scan and how to label it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub directory_path: PathBuf,
    pub server_location: String,
    pub platform_id: String,
    #[serde(default)]
    pub recursive: bool,
}

/// What to do with a file already recorded at the same path with the same hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescanPolicy {
    /// Record a new file location on every scan.
    #[default]
    Append,
    /// Leave the existing location alone and count the file as skipped.
    SkipExisting,
}

/// Options for a directory scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Lowercase extensions, no leading dot.
    pub extensions: HashSet<String>,
    pub rescan: RescanPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: extension_set(DEFAULT_EXTENSIONS),
            rescan: RescanPolicy::default(),
        }
    }
}

/// Result of one scan. Never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    /// Files that were admitted and hashed.
    pub files_found: Vec<String>,
    /// Entries created by this scan.
    pub games_added: Vec<CatalogEntry>,
    /// One line per problem, prefixed with the file path.
    pub errors: Vec<String>,
    /// Files skipped under [`RescanPolicy::SkipExisting`].
    pub skipped_existing: usize,
}

/// Result of matching one file against the catalog.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub entry: CatalogEntry,
    pub location: FileLocation,
    pub created: bool,
}

/// Find the entry for `(title, platform_id)`, creating it if absent, and
/// attach `file` to it.
pub fn match_file(
    store: &dyn CatalogStore,
    title: &str,
    platform_id: &str,
    file: &NewFileLocation,
) -> Result<MatchOutcome, OperationError> {
    let (entry, created) = match store.find_entry(title, platform_id)? {
        Some(entry) => (entry, false),
        None => (store.create_entry(title, platform_id)?, true),
    };
    let location = store.attach_file(entry.id, file)?;
    Ok(MatchOutcome {
        entry,
        location,
        created,
    })
}

/// Scan `request.directory_path` and record every admitted file.
///
/// Only failure to start (unknown platform, unusable root, store failure while
/// checking the platform) is an error; everything else lands in
/// [`ScanResult::errors`].
pub fn scan_directory(
    store: &dyn CatalogStore,
    request: &ScanRequest,
    options: &ScanOptions,
    progress: Option<&dyn ScanProgress>,
) -> Result<ScanResult, ScanError> {
    if store.platform(&request.platform_id)?.is_none() {
        return Err(ScanError::UnknownPlatform(request.platform_id.clone()));
    }

    let root = std::path::absolute(&request.directory_path).map_err(|source| {
        WalkError::Access {
            path: request.directory_path.clone(),
            source,
        }
    })?;
    let walk = walk_roms(&root, request.recursive, &options.extensions)?;

    let mut result = ScanResult::default();
    for skipped in walk.errors {
        if let Some(p) = progress {
            p.on_error(&file_name(&skipped.path), &skipped.message);
        }
        result.errors.push(skipped.to_string());
    }

    let total = walk.files.len();
    for (i, candidate) in walk.files.iter().enumerate() {
        let filename = file_name(&candidate.path);
        if let Some(p) = progress {
            p.on_file(i + 1, total, &filename);
        }

        match scan_file(store, request, options, &candidate.path, &mut result) {
            Ok(Some(entry)) => {
                if let Some(p) = progress {
                    p.on_new_entry(&entry.title);
                }
                result.games_added.push(entry);
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("{}: {}", candidate.path.display(), e);
                if let Some(p) = progress {
                    p.on_error(&filename, &e);
                }
                result
                    .errors
                    .push(format!("{}: {}", candidate.path.display(), e));
            }
        }
    }

    log::info!(
        "Scanned {} ({}): {} files, {} new entries, {} skipped, {} errors",
        root.display(),
        request.platform_id,
        result.files_found.len(),
        result.games_added.len(),
        result.skipped_existing,
        result.errors.len()
    );
    if let Some(p) = progress {
        p.on_complete(&result);
    }
    Ok(result)
}

/// Hash, normalize, and match one file. Returns the entry if one was created.
fn scan_file(
    store: &dyn CatalogStore,
    request: &ScanRequest,
    options: &ScanOptions,
    path: &Path,
    result: &mut ScanResult,
) -> Result<Option<CatalogEntry>, String> {
    let digest = hash_file(path).map_err(|e| e.to_string())?;
    let file_path = path.display().to_string();
    result.files_found.push(file_path.clone());

    let title = normalize_title_with(&file_name(path), |ext| {
        options.extensions.contains(&ext.to_ascii_lowercase()) || is_rom_extension(ext)
    });
    if title.is_empty() {
        return Err("no title left after normalizing the filename".to_string());
    }

    if options.rescan == RescanPolicy::SkipExisting
        && store
            .file_location_exists(&file_path, &digest.hash)
            .map_err(|e| e.to_string())?
    {
        log::debug!("Already recorded: {}", file_path);
        result.skipped_existing += 1;
        return Ok(None);
    }

    let file = NewFileLocation {
        server_location: request.server_location.clone(),
        file_path,
        file_size: digest.size,
        file_hash: digest.hash,
    };
    let outcome = match_file(store, &title, &request.platform_id, &file)
        .map_err(|e| e.to_string())?;
    if outcome.created {
        log::debug!("New entry {} '{}'", outcome.entry.id, outcome.entry.title);
        return Ok(Some(outcome.entry));
    }
    Ok(None)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
