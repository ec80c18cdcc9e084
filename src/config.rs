//! Configuration file support.
//!
//! Preferences and key bindings are stored as JSON at
//! `<config_dir>/mothra/config.json`. A missing or unreadable file falls back
//! to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{AUTOSAVE_DEBOUNCE_SECS, AUTOSAVE_MIN_INTERVAL_SECS, DEFAULT_BOX_OPACITY, UNDO_HISTORY_LIMIT};
use crate::keybindings::KeyBindings;
use crate::persistence::AutoSaveManager;
use crate::store::AnnotationStore;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub preferences: UserPreferences,

    #[serde(default)]
    pub keybindings: KeyBindings,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub log_level: LogLevel,

    /// Fill alpha of annotation boxes, 0..1
    pub box_opacity: f64,

    pub show_labels: bool,

    /// Undo snapshots kept per session, 0 for no limit
    pub undo_history_limit: usize,

    /// Whether drag/resize commits can be undone
    pub undoable_moves: bool,

    pub autosave_enabled: bool,

    /// Quiet time after a change before the session is written
    pub autosave_debounce_secs: f64,

    /// Minimum time between two writes
    pub autosave_interval_secs: f64,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            box_opacity: DEFAULT_BOX_OPACITY,
            show_labels: true,
            undo_history_limit: UNDO_HISTORY_LIMIT,
            undoable_moves: false,
            autosave_enabled: true,
            autosave_debounce_secs: AUTOSAVE_DEBOUNCE_SECS,
            autosave_interval_secs: AUTOSAVE_MIN_INTERVAL_SECS,
        }
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl UserPreferences {
    /// A store configured from these preferences.
    pub fn build_store(&self) -> AnnotationStore {
        AnnotationStore::new()
            .with_history_limit(self.undo_history_limit)
            .with_undoable_moves(self.undoable_moves)
    }

    pub fn build_auto_save(&self) -> AutoSaveManager {
        let mut manager = AutoSaveManager::new()
            .with_debounce_delay(seconds(self.autosave_debounce_secs))
            .with_save_interval(seconds(self.autosave_interval_secs));
        manager.set_enabled(self.autosave_enabled);
        manager
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            keybindings: KeyBindings::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Default config file path, trying the XDG config directory first.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("mothra").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| home.join(".config").join("mothra").join(Self::default_filename()))
        }
    }

    /// Read `path` without logging. A missing file is `Ok(None)`.
    pub fn read_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map(Some)
    }

    /// Load from `path`. Returns None if the file is missing or invalid.
    pub fn load_from(path: &Path) -> Option<Self> {
        match Self::read_from(path) {
            Ok(Some(config)) => {
                log::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Ok(None) => {
                log::debug!("No config file found at {:?}", path);
                None
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Configuration from the default path, or defaults.
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Like [`load_or_default`](Self::load_or_default), but hands the
    /// failure back instead of logging it. For callers that configure
    /// logging from the loaded level.
    pub fn load_or_default_deferred() -> (Self, Option<ConfigError>) {
        match Self::default_path().map(|path| Self::read_from(&path)) {
            Some(Ok(Some(config))) => (config, None),
            Some(Err(e)) => (Self::default(), Some(e)),
            Some(Ok(None)) | None => (Self::default(), None),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::KeyBinding;
    use mothra_ui::Key;

    #[test]
    fn test_default_config_roundtrip() {
        let config = AppConfig::new();
        let json = config.to_json().unwrap();
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_json(r#"{"version":1,"preferences":{"show_labels":false}}"#).unwrap();
        assert!(!config.preferences.show_labels);
        assert_eq!(config.preferences.box_opacity, DEFAULT_BOX_OPACITY);
        assert_eq!(config.keybindings, KeyBindings::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = AppConfig::from_json(r#"{"version":99}"#).unwrap_err();
        assert!(matches!(err, ConfigError::VersionTooNew { file_version: 99, .. }));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mothra").join("config.json");
        assert!(AppConfig::load_from(&path).is_none());

        let mut config = AppConfig::new();
        config.preferences.undoable_moves = true;
        config.keybindings.toggle_labels = vec![KeyBinding::plain(Key::Char('t'))];
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), Some(config));

        std::fs::write(&path, "{ broken").unwrap();
        assert!(AppConfig::load_from(&path).is_none());
    }

    #[test]
    fn test_read_from_separates_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(matches!(AppConfig::read_from(&path), Ok(None)));

        std::fs::write(&path, "{ broken").unwrap();
        assert!(matches!(AppConfig::read_from(&path), Err(ConfigError::ParseError(_))));

        std::fs::write(&path, r#"{"version": 99}"#).unwrap();
        assert!(matches!(AppConfig::read_from(&path), Err(ConfigError::VersionTooNew { .. })));
    }

    #[test]
    fn test_preferences_build_store() {
        let prefs = UserPreferences {
            undo_history_limit: 1,
            undoable_moves: true,
            ..UserPreferences::default()
        };
        let mut store = prefs.build_store();
        let id = store.add_annotation(crate::model::BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        store.move_annotation(&id, crate::model::BoundingBox::new(5.0, 0.0, 10.0, 10.0));
        assert_eq!(store.undo_count(), 1);
        assert!(store.undo());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_preferences_build_auto_save() {
        let prefs = UserPreferences {
            autosave_enabled: false,
            autosave_debounce_secs: -3.0,
            ..UserPreferences::default()
        };
        assert!(!prefs.build_auto_save().is_enabled());
        assert!(UserPreferences::default().build_auto_save().is_enabled());
    }
}
