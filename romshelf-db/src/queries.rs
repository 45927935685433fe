//! Read queries for the catalog database.
//!
//! Provides platform listing, duplicate-candidate scans, enrichment
//! selection, and summary counts.

use romshelf_catalog::types::*;
use rusqlite::{Connection, params};

use crate::operations::{FILE_LOCATION_COLUMNS, OperationError, row_to_file_location};

// ── Platform Listing ────────────────────────────────────────────────────────

/// List all platforms, ordered by id.
pub fn list_platforms(conn: &Connection) -> Result<Vec<Platform>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name FROM platforms ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Platform::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── File Location Lookups ───────────────────────────────────────────────────

/// Every file location with a non-empty hash, ordered by hash then id.
///
/// Equal hashes come out adjacent, which is what duplicate grouping relies on.
pub fn hashed_file_locations(conn: &Connection) -> Result<Vec<FileLocation>, OperationError> {
    let sql = format!(
        "SELECT {FILE_LOCATION_COLUMNS} FROM file_locations
         WHERE file_hash != '' ORDER BY file_hash, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_file_location)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// All file locations attached to one game.
pub fn file_locations_for_game(
    conn: &Connection,
    game_id: i64,
) -> Result<Vec<FileLocation>, OperationError> {
    let sql = format!(
        "SELECT {FILE_LOCATION_COLUMNS} FROM file_locations WHERE game_id = ?1 ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![game_id], row_to_file_location)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Enrichment Selection ────────────────────────────────────────────────────

/// Ids of games with no description or no cover art, in id order.
pub fn games_missing_metadata(conn: &Connection) -> Result<Vec<i64>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM games
         WHERE description IS NULL OR TRIM(description) = ''
            OR cover_art_url IS NULL OR TRIM(cover_art_url) = ''
         ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Summary counts for the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub platforms: i64,
    pub games: i64,
    pub file_locations: i64,
    pub unhashed_files: i64,
    pub games_missing_metadata: i64,
}

pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let count = |sql: &str| -> Result<i64, OperationError> {
        Ok(conn.query_row(sql, [], |row| row.get(0))?)
    };
    Ok(CatalogStats {
        platforms: count("SELECT COUNT(*) FROM platforms")?,
        games: count("SELECT COUNT(*) FROM games")?,
        file_locations: count("SELECT COUNT(*) FROM file_locations")?,
        unhashed_files: count("SELECT COUNT(*) FROM file_locations WHERE file_hash = ''")?,
        games_missing_metadata: count(
            "SELECT COUNT(*) FROM games
             WHERE description IS NULL OR TRIM(description) = ''
                OR cover_art_url IS NULL OR TRIM(cover_art_url) = ''",
        )?,
    })
}
