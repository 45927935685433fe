//! SQLite persistence layer for the game catalog.
//!
//! Provides schema creation, CRUD operations, read queries, and the
//! [`CatalogStore`] boundary the ingestion pipeline talks to, backed by
//! SQLite (via rusqlite with the bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

pub use operations::{
    OperationError, delete_game, file_location_exists, find_game, find_platform, get_game,
    insert_file_location, insert_game, seed_default_platforms, update_game_metadata,
    upsert_platform,
};
pub use queries::{
    CatalogStats, catalog_stats, file_locations_for_game, games_missing_metadata,
    hashed_file_locations, list_platforms,
};
pub use schema::{SchemaError, open_database, open_memory};
pub use store::{CatalogStore, SqliteCatalog};
