//! CRUD operations for platforms, games, and file locations.

use romshelf_catalog::types::*;
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Catalog connection lock poisoned")]
    LockPoisoned,
}

impl OperationError {
    fn not_found(entity_type: &str, id: impl ToString) -> Self {
        OperationError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

// ── Platform Operations ─────────────────────────────────────────────────────

/// Insert or update a platform.
pub fn upsert_platform(conn: &Connection, platform: &Platform) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO platforms (id, name) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        params![platform.id, platform.name],
    )?;
    Ok(())
}

/// Insert the built-in platform table. Existing rows are left alone so
/// user renames survive. Returns the number of platforms added.
pub fn seed_default_platforms(conn: &Connection) -> Result<usize, OperationError> {
    let mut stmt = conn.prepare("INSERT OR IGNORE INTO platforms (id, name) VALUES (?1, ?2)")?;
    let mut added = 0;
    for (id, name) in DEFAULT_PLATFORMS {
        added += stmt.execute(params![id, name])?;
    }
    Ok(added)
}

/// Look up a platform by id.
pub fn find_platform(conn: &Connection, id: &str) -> Result<Option<Platform>, OperationError> {
    let result = conn.query_row(
        "SELECT id, name FROM platforms WHERE id = ?1",
        params![id],
        |row| Ok(Platform::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    );
    match result {
        Ok(platform) => Ok(Some(platform)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Game Operations ─────────────────────────────────────────────────────────

pub(crate) const GAME_COLUMNS: &str = "id, title, platform_id, year, genre, rating, description,
     cover_art_url, box_art_url, external_id, created_at, updated_at";

pub(crate) fn row_to_game(row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
    Ok(CatalogEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        platform_id: row.get(2)?,
        year: row.get(3)?,
        genre: row.get(4)?,
        rating: row.get(5)?,
        description: row.get(6)?,
        cover_art_url: row.get(7)?,
        box_art_url: row.get(8)?,
        external_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Find a game by its exact (title, platform) identity.
///
/// The comparison is case-sensitive: "Tetris" and "TETRIS" are different games.
pub fn find_game(
    conn: &Connection,
    title: &str,
    platform_id: &str,
) -> Result<Option<CatalogEntry>, OperationError> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE title = ?1 AND platform_id = ?2");
    match conn.query_row(&sql, params![title, platform_id], row_to_game) {
        Ok(game) => Ok(Some(game)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load a game by numeric id.
pub fn get_game(conn: &Connection, id: i64) -> Result<Option<CatalogEntry>, OperationError> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1");
    match conn.query_row(&sql, params![id], row_to_game) {
        Ok(game) => Ok(Some(game)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Create a game with only its identity set and return the stored row.
pub fn insert_game(
    conn: &Connection,
    title: &str,
    platform_id: &str,
) -> Result<CatalogEntry, OperationError> {
    conn.execute(
        "INSERT INTO games (title, platform_id) VALUES (?1, ?2)",
        params![title, platform_id],
    )?;
    let id = conn.last_insert_rowid();
    get_game(conn, id)?.ok_or_else(|| OperationError::not_found("game", id))
}

/// Apply a metadata patch. Fields that are `None` in the patch keep their
/// stored value.
pub fn update_game_metadata(
    conn: &Connection,
    id: i64,
    patch: &MetadataPatch,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE games SET
             description = COALESCE(?2, description),
             rating = COALESCE(?3, rating),
             genre = COALESCE(?4, genre),
             year = COALESCE(?5, year),
             cover_art_url = COALESCE(?6, cover_art_url),
             box_art_url = COALESCE(?7, box_art_url),
             external_id = COALESCE(?8, external_id),
             updated_at = datetime('now')
         WHERE id = ?1",
        params![
            id,
            patch.description,
            patch.rating,
            patch.genre,
            patch.year,
            patch.cover_art_url,
            patch.box_art_url,
            patch.external_id,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("game", id));
    }
    Ok(())
}

/// Delete a game. Its file locations go with it.
pub fn delete_game(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM games WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::not_found("game", id));
    }
    Ok(())
}

// ── File Location Operations ────────────────────────────────────────────────

pub(crate) const FILE_LOCATION_COLUMNS: &str =
    "id, game_id, server_location, file_path, file_size, file_hash, created_at";

pub(crate) fn row_to_file_location(row: &rusqlite::Row) -> rusqlite::Result<FileLocation> {
    let size: i64 = row.get(4)?;
    Ok(FileLocation {
        id: row.get(0)?,
        game_id: row.get(1)?,
        server_location: row.get(2)?,
        file_path: row.get(3)?,
        file_size: size.max(0) as u64,
        file_hash: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Attach a file to a game and return the stored row.
pub fn insert_file_location(
    conn: &Connection,
    game_id: i64,
    file: &NewFileLocation,
) -> Result<FileLocation, OperationError> {
    conn.execute(
        "INSERT INTO file_locations (game_id, server_location, file_path, file_size, file_hash)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            game_id,
            file.server_location,
            file.file_path,
            i64::try_from(file.file_size).unwrap_or(i64::MAX),
            file.file_hash,
        ],
    )?;
    let id = conn.last_insert_rowid();
    let sql = format!("SELECT {FILE_LOCATION_COLUMNS} FROM file_locations WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], row_to_file_location)?)
}

/// True if a file location with this exact path and hash is already recorded.
pub fn file_location_exists(
    conn: &Connection,
    file_path: &str,
    file_hash: &str,
) -> Result<bool, OperationError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM file_locations WHERE file_path = ?1 AND file_hash = ?2)",
        params![file_path, file_hash],
        |row| row.get(0),
    )?;
    Ok(exists)
}
