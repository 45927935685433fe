//! Data model types for the game catalog.
//!
//! These types represent the persistent catalog schema (platforms, catalog
//! entries, file locations) plus the transient values that flow through the
//! ingestion pipeline (duplicate groups, provider metadata).

use serde::{Deserialize, Serialize};

// ── Platform ────────────────────────────────────────────────────────────────

/// A game platform/console the catalog knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Short identifier used in scan requests (e.g., "snes").
    pub id: String,
    /// Display name handed to metadata providers (e.g., "Super Nintendo Entertainment System").
    pub name: String,
}

impl Platform {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Platforms seeded into every new catalog database.
pub const DEFAULT_PLATFORMS: &[(&str, &str)] = &[
    ("nes", "Nintendo Entertainment System"),
    ("snes", "Super Nintendo Entertainment System"),
    ("n64", "Nintendo 64"),
    ("gc", "Nintendo GameCube"),
    ("wii", "Wii"),
    ("gb", "Game Boy"),
    ("gbc", "Game Boy Color"),
    ("gba", "Game Boy Advance"),
    ("nds", "Nintendo DS"),
    ("3ds", "Nintendo 3DS"),
    ("ps1", "PlayStation"),
    ("ps2", "PlayStation 2"),
    ("psp", "PlayStation Portable"),
    ("sms", "Sega Master System"),
    ("genesis", "Sega Genesis"),
    ("segacd", "Sega CD"),
    ("32x", "Sega 32X"),
    ("saturn", "Sega Saturn"),
    ("dreamcast", "Dreamcast"),
    ("gg", "Sega Game Gear"),
    ("xbox", "Xbox"),
];

// ── Catalog Entry ───────────────────────────────────────────────────────────

/// A logical game record, identified by its exact (title, platform) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub title: String,
    pub platform_id: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    /// Rating on a 0-10 scale.
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub cover_art_url: Option<String>,
    pub box_art_url: Option<String>,
    /// Identifier of the matching record at the metadata provider.
    pub external_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl CatalogEntry {
    /// True if the entry lacks a description or cover art and should be enriched.
    pub fn needs_enrichment(&self) -> bool {
        is_blank(&self.description) || is_blank(&self.cover_art_url)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

// ── File Location ───────────────────────────────────────────────────────────

/// One physical file on a named server/storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLocation {
    pub id: i64,
    pub game_id: i64,
    pub server_location: String,
    pub file_path: String,
    pub file_size: u64,
    /// Lowercase hex content digest.
    pub file_hash: String,
    pub created_at: String,
}

/// A file location that has been hashed but not yet attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFileLocation {
    pub server_location: String,
    pub file_path: String,
    pub file_size: u64,
    pub file_hash: String,
}

// ── Duplicates ──────────────────────────────────────────────────────────────

/// File locations sharing one content hash (always two or more members).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub hash: String,
    pub files: Vec<FileLocation>,
}

// ── Provider Metadata ───────────────────────────────────────────────────────

/// Metadata returned by a provider for one search hit.
///
/// Every field is optional; empty strings and zero values count as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataEnvelope {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Rating rescaled to 0-10.
    pub rating: Option<f64>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub cover_art_url: Option<String>,
    pub box_art_url: Option<String>,
    pub provider_id: Option<String>,
}

/// The fields of a [`MetadataEnvelope`] that will be written to an entry.
///
/// `None` means "leave the stored value alone". The title is never part of
/// a patch because it is half of the entry's identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataPatch {
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub cover_art_url: Option<String>,
    pub box_art_url: Option<String>,
    pub external_id: Option<String>,
}

impl MetadataPatch {
    /// Keep only the non-empty, non-zero fields of an envelope.
    pub fn from_envelope(envelope: &MetadataEnvelope) -> Self {
        Self {
            description: non_empty(&envelope.description),
            rating: envelope.rating.filter(|r| r.is_finite() && *r > 0.0),
            genre: non_empty(&envelope.genre),
            year: envelope.year.filter(|y| *y > 0),
            cover_art_url: non_empty(&envelope.cover_art_url),
            box_art_url: non_empty(&envelope.box_art_url),
            external_id: non_empty(&envelope.provider_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the fields this patch would set, for logging.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.description.is_some() {
            names.push("description");
        }
        if self.rating.is_some() {
            names.push("rating");
        }
        if self.genre.is_some() {
            names.push("genre");
        }
        if self.year.is_some() {
            names.push("year");
        }
        if self.cover_art_url.is_some() {
            names.push("cover_art_url");
        }
        if self.box_art_url.is_some() {
            names.push("box_art_url");
        }
        if self.external_id.is_some() {
            names.push("external_id");
        }
        names
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
