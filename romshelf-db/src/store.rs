//! The catalog boundary used by the ingestion pipeline.
//!
//! Scanning, duplicate detection, and enrichment only need a handful of
//! find/create/update calls. [`CatalogStore`] names those calls so the
//! pipeline can run against a shared SQLite connection or an in-test fake.

use std::path::Path;
use std::sync::Mutex;

use romshelf_catalog::types::*;
use rusqlite::Connection;

use crate::operations::{self, OperationError};
use crate::queries;
use crate::schema::{self, SchemaError};

/// Catalog operations the pipeline depends on.
pub trait CatalogStore: Send + Sync {
    fn platform(&self, id: &str) -> Result<Option<Platform>, OperationError>;

    /// Exact (title, platform) lookup.
    fn find_entry(
        &self,
        title: &str,
        platform_id: &str,
    ) -> Result<Option<CatalogEntry>, OperationError>;

    /// Create an entry with only title and platform set.
    fn create_entry(&self, title: &str, platform_id: &str)
    -> Result<CatalogEntry, OperationError>;

    fn entry(&self, id: i64) -> Result<Option<CatalogEntry>, OperationError>;

    fn attach_file(
        &self,
        game_id: i64,
        file: &NewFileLocation,
    ) -> Result<FileLocation, OperationError>;

    fn file_location_exists(&self, file_path: &str, file_hash: &str)
    -> Result<bool, OperationError>;

    /// All file locations with a non-empty hash, ordered by hash then id.
    fn hashed_file_locations(&self) -> Result<Vec<FileLocation>, OperationError>;

    /// Ids of entries lacking a description or cover art.
    fn entries_missing_metadata(&self) -> Result<Vec<i64>, OperationError>;

    fn apply_metadata(&self, id: i64, patch: &MetadataPatch) -> Result<(), OperationError>;
}

/// [`CatalogStore`] over a single SQLite connection.
///
/// The lock is held for one operation at a time.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open (creating or migrating as needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, SchemaError> {
        Ok(Self::new(schema::open_database(path)?))
    }

    pub fn in_memory() -> Result<Self, SchemaError> {
        Ok(Self::new(schema::open_memory()?))
    }

    /// Run `f` with the underlying connection, for queries outside the trait.
    pub fn with_connection<R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<R, OperationError>,
    ) -> Result<R, OperationError> {
        let conn = self.conn.lock().map_err(|_| OperationError::LockPoisoned)?;
        f(&conn)
    }
}

impl CatalogStore for SqliteCatalog {
    fn platform(&self, id: &str) -> Result<Option<Platform>, OperationError> {
        self.with_connection(|conn| operations::find_platform(conn, id))
    }

    fn find_entry(
        &self,
        title: &str,
        platform_id: &str,
    ) -> Result<Option<CatalogEntry>, OperationError> {
        self.with_connection(|conn| operations::find_game(conn, title, platform_id))
    }

    fn create_entry(
        &self,
        title: &str,
        platform_id: &str,
    ) -> Result<CatalogEntry, OperationError> {
        self.with_connection(|conn| operations::insert_game(conn, title, platform_id))
    }

    fn entry(&self, id: i64) -> Result<Option<CatalogEntry>, OperationError> {
        self.with_connection(|conn| operations::get_game(conn, id))
    }

    fn attach_file(
        &self,
        game_id: i64,
        file: &NewFileLocation,
    ) -> Result<FileLocation, OperationError> {
        self.with_connection(|conn| operations::insert_file_location(conn, game_id, file))
    }

    fn file_location_exists(
        &self,
        file_path: &str,
        file_hash: &str,
    ) -> Result<bool, OperationError> {
        self.with_connection(|conn| operations::file_location_exists(conn, file_path, file_hash))
    }

    fn hashed_file_locations(&self) -> Result<Vec<FileLocation>, OperationError> {
        self.with_connection(queries::hashed_file_locations)
    }

    fn entries_missing_metadata(&self) -> Result<Vec<i64>, OperationError> {
        self.with_connection(queries::games_missing_metadata)
    }

    fn apply_metadata(&self, id: i64, patch: &MetadataPatch) -> Result<(), OperationError> {
        self.with_connection(|conn| operations::update_game_metadata(conn, id, patch))
    }
}
