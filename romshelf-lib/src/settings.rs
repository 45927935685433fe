//! Persisted settings: `~/.config/romshelf/settings.toml`.
//!
//! Every field has a default so a missing or partial file is fine. The CLI
//! layers its flags on top of what is loaded here.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::scanner::extension_set;

/// Extensions admitted by a scan unless the settings file overrides them.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "rom", "bin", "iso", "cue", "img", "zip", "7z", "rar", "nes", "smc", "sfc", "gb", "gbc",
    "gba", "n64", "z64", "psx", "ps2", "gcm", "wad", "cia", "3ds",
];

/// Directory holding `settings.toml` and `credentials.toml`.
pub fn config_dir() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("romshelf")
}

/// Canonical path to the settings file.
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

/// Where the catalog lives when neither flag nor settings say otherwise.
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("romshelf").join("catalog.db")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub scan: ScanSettings,
    pub enrich: EnrichSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub extensions: Vec<String>,
    /// Label recorded on every file location when `--server` isn't given.
    pub server_location: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            server_location: "local".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichSettings {
    pub batch_size: usize,
    pub delay_seconds: u64,
    /// Jobs that may wait behind the running one.
    pub queue_capacity: usize,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay_seconds: 2,
            queue_capacity: 8,
        }
    }
}

impl Settings {
    /// Load from the canonical path. A missing file yields defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&settings_path())
    }

    /// Write atomically: temp file in the same directory, then rename.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Resolve the database path: explicit override, then settings, then default.
    pub fn database_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.library.database.clone())
            .unwrap_or_else(default_database_path)
    }

    pub fn extension_set(&self) -> HashSet<String> {
        extension_set(&self.scan.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.enrich.batch_size, 5);
        assert_eq!(settings.enrich.delay_seconds, 2);
        assert_eq!(settings.scan.server_location, "local");
        assert_eq!(settings.extension_set().len(), DEFAULT_EXTENSIONS.len());
        assert!(settings.extension_set().contains("3ds"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [enrich]
            batch_size = 10

            [scan]
            extensions = ["nes", "SFC"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.enrich.batch_size, 10);
        assert_eq!(settings.enrich.delay_seconds, 2);
        assert_eq!(settings.scan.server_location, "local");
        let exts = settings.extension_set();
        assert_eq!(exts.len(), 2);
        assert!(exts.contains("sfc"));
    }

    #[test]
    fn database_path_priority() {
        let mut settings = Settings::default();
        assert_eq!(settings.database_path(None), default_database_path());

        settings.library.database = Some(PathBuf::from("/data/lib.db"));
        assert_eq!(settings.database_path(None), PathBuf::from("/data/lib.db"));
        assert_eq!(
            settings.database_path(Some(PathBuf::from("/tmp/x.db"))),
            PathBuf::from("/tmp/x.db")
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.scan.server_location = "nas-01".to_string();
        settings.enrich.queue_capacity = 2;
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[enrich\nbatch_size = ").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Parse(_))
        ));
    }
}
