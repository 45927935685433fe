//! Filesystem building blocks for the ingestion pipeline: content hashing,
//! directory walking, and persisted settings.

pub mod error;
pub mod hasher;
pub mod scanner;
pub mod settings;
pub mod util;

pub use error::{HashError, SettingsError, WalkError};
pub use hasher::{FileDigest, hash_file, hash_reader};
pub use scanner::{CandidateFile, SkippedEntry, WalkOutcome, extension_set, walk_roms};
pub use settings::Settings;
