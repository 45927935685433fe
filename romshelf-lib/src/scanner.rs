//! Directory walking: find files whose extension is on the allow-list.

use std::collections::HashSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::WalkError;

/// A regular file admitted by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub size: u64,
}

/// An entry the walker could not read or stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Files found plus the per-entry problems hit along the way.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<CandidateFile>,
    pub errors: Vec<SkippedEntry>,
}

/// Walk `root` depth-first in file-name order, collecting files whose
/// extension is in `extensions` (lowercase, no leading dot).
///
/// Without `recursive`, only the root's immediate children are considered.
/// Symlinked directories are never entered. Entries that cannot be read or
/// stat'ed are recorded in [`WalkOutcome::errors`] and the walk continues.
pub fn walk_roms(
    root: &Path,
    recursive: bool,
    extensions: &HashSet<String>,
) -> Result<WalkOutcome, WalkError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(WalkError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(WalkError::PathNotFound(root.to_path_buf()));
        }
        Err(source) => {
            return Err(WalkError::Access {
                path: root.to_path_buf(),
                source,
            });
        }
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name();

    let mut outcome = WalkOutcome::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                log::warn!("Error accessing {}: {}", path.display(), e);
                outcome.errors.push(SkippedEntry {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if entry.file_type().is_dir() || !has_matching_extension(entry.path(), extensions) {
            continue;
        }

        // Stat through symlinks so a dangling link surfaces as an error.
        match std::fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => outcome.files.push(CandidateFile {
                path: entry.path().to_path_buf(),
                size: meta.len(),
            }),
            Ok(_) => {
                log::debug!("Skipping non-regular file {}", entry.path().display());
            }
            Err(e) => {
                log::warn!("Cannot stat {}: {}", entry.path().display(), e);
                outcome.errors.push(SkippedEntry {
                    path: entry.path().to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }

    log::debug!(
        "Walked {}: {} candidate files, {} errors",
        root.display(),
        outcome.files.len(),
        outcome.errors.len()
    );
    Ok(outcome)
}

/// Build a lowercase extension set, tolerating leading dots.
pub fn extension_set<S: AsRef<str>>(extensions: &[S]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Check if a path has an extension in the allowed set.
fn has_matching_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}
