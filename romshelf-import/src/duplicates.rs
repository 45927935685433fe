//! Library-wide duplicate detection by content hash.

use std::collections::BTreeMap;

use romshelf_catalog::types::{DuplicateGroup, FileLocation};
use romshelf_db::{CatalogStore, OperationError};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DuplicateReport {
    pub duplicates: Vec<DuplicateGroup>,
    /// Number of groups.
    pub count: usize,
}

/// Group locations sharing a non-empty hash. Groups come out ordered by
/// hash, members by location id; singletons are dropped.
pub fn group_duplicates(locations: impl IntoIterator<Item = FileLocation>) -> Vec<DuplicateGroup> {
    let mut by_hash: BTreeMap<String, Vec<FileLocation>> = BTreeMap::new();
    for location in locations {
        if location.file_hash.is_empty() {
            continue;
        }
        by_hash
            .entry(location.file_hash.clone())
            .or_default()
            .push(location);
    }

    by_hash
        .into_iter()
        .filter(|(_, files)| files.len() >= 2)
        .map(|(hash, mut files)| {
            files.sort_by_key(|f| f.id);
            DuplicateGroup { hash, files }
        })
        .collect()
}

/// Read every hashed file location and report the duplicate groups.
pub fn find_duplicates(store: &dyn CatalogStore) -> Result<DuplicateReport, OperationError> {
    let duplicates = group_duplicates(store.hashed_file_locations()?);
    log::debug!("Found {} duplicate groups", duplicates.len());
    Ok(DuplicateReport {
        count: duplicates.len(),
        duplicates,
    })
}
