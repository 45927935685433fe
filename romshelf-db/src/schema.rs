//! Catalog schema: table definitions, versioning and upgrades.

use rusqlite::Connection;
use thiserror::Error;

use crate::operations::{OperationError, seed_default_platforms};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Catalog schema version {found} is newer than this build supports ({expected})")]
    VersionMismatch { expected: i32, found: i32 },
    #[error("Failed to seed platforms: {0}")]
    Seed(#[from] OperationError),
}

/// Schema version written by this build. Bump together with [`migrate`].
pub const CURRENT_VERSION: i32 = 2;

/// Create any missing tables and indexes. Existing tables are left as they are.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    record_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open the catalog at `path`, creating or upgrading its schema.
///
/// Missing built-in platforms are inserted on every open.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")?;

    match read_schema_version(&conn)? {
        0 => {
            create_schema(&conn)?;
            log::debug!("Created catalog schema at {}", path.display());
        }
        found if found > CURRENT_VERSION => {
            return Err(SchemaError::VersionMismatch {
                expected: CURRENT_VERSION,
                found,
            });
        }
        found => migrate(&conn, found)?,
    }

    let seeded = seed_default_platforms(&conn)?;
    if seeded > 0 {
        log::debug!("Seeded {} platforms", seeded);
    }

    Ok(conn)
}

/// In-memory catalog with the full schema and seeded platforms.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", true)?;
    create_schema(&conn)?;
    seed_default_platforms(&conn)?;
    Ok(conn)
}

/// Highest recorded schema version; 0 for a fresh database.
fn read_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let has_table: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(0);
    }
    Ok(conn.query_row("SELECT IFNULL(MAX(version), 0) FROM schema_version", [], |row| {
        row.get(0)
    })?)
}

fn record_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Step an older schema forward one version at a time.
fn migrate(conn: &Connection, from: i32) -> Result<(), SchemaError> {
    for target in (from + 1)..=CURRENT_VERSION {
        if target == 2 {
            // v2: box art alongside cover art
            conn.execute_batch("ALTER TABLE games ADD COLUMN box_art_url TEXT;")?;
        }
        record_schema_version(conn, target)?;
        log::info!("Upgraded catalog schema to version {}", target);
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- One row per applied version
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Scan targets; names are what providers are searched with
CREATE TABLE IF NOT EXISTS platforms (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

-- Logical games: identity is the exact (title, platform) pair
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    platform_id TEXT NOT NULL REFERENCES platforms(id),
    year INTEGER,
    genre TEXT,
    rating REAL,
    description TEXT,
    cover_art_url TEXT,
    box_art_url TEXT,
    external_id TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_games_identity ON games(title, platform_id);

-- Physical files backing a game
CREATE TABLE IF NOT EXISTS file_locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    server_location TEXT NOT NULL,
    file_path TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    file_hash TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_file_locations_game ON file_locations(game_id);
CREATE INDEX IF NOT EXISTS idx_file_locations_hash ON file_locations(file_hash);
CREATE INDEX IF NOT EXISTS idx_file_locations_path ON file_locations(file_path);
"#;
