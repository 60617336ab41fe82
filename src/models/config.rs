//! Configuration model.

use super::conversion::{TargetFormat, DEFAULT_QUALITY};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings.
///
/// Flat document; every key is optional in the file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last used directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// File type preset used when no pattern is given.
    pub preset: String,
    /// Comma-separated glob patterns.
    pub pattern: String,
    /// Naming template.
    pub rename_template: String,
    /// First sequence number.
    pub start_number: u64,
    /// Conversion target format.
    pub convert_format: TargetFormat,
    /// Lossy encoder quality.
    pub quality: u8,
    /// Search subdirectories.
    pub recursive: bool,
    /// Case-sensitive name search.
    pub case_sensitive: bool,
    /// Where the undo history is stored.
    pub history_file: PathBuf,
    /// Maximum number of batches kept for undo.
    pub max_undo_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directory: None,
            preset: "all".to_string(),
            pattern: String::new(),
            rename_template: "file_{n:03d}".to_string(),
            start_number: 1,
            convert_format: TargetFormat::Jpeg,
            quality: DEFAULT_QUALITY,
            recursive: true,
            case_sensitive: false,
            history_file: dirs_config_path().join("history.json"),
            max_undo_depth: 50,
        }
    }
}

/// Get the configuration directory path.
pub fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("batch_renamer")
}

/// Default settings file location.
pub fn config_file_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load settings from the default location.
pub fn load_config() -> Settings {
    load_config_from(&config_file_path())
}

/// Load settings from a file, falling back to defaults on any problem.
pub fn load_config_from(path: &Path) -> Settings {
    if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!("Could not parse settings {:?}: {}", path, e),
            },
            Err(e) => tracing::warn!("Could not read settings {:?}: {}", path, e),
        }
    }

    Settings::default()
}

/// Save settings to a file.
pub fn save_config(settings: &Settings, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(settings)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;

    tracing::info!("Settings saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.start_number, 1);
        assert_eq!(settings.quality, 85);
        assert_eq!(settings.convert_format, TargetFormat::Jpeg);
        assert!(settings.recursive);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "start_number = 10\nconvert_format = \"webp\"\n").unwrap();

        let settings = load_config_from(&path);
        assert_eq!(settings.start_number, 10);
        assert_eq!(settings.convert_format, TargetFormat::Webp);
        assert_eq!(settings.quality, 85);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "start_number = \"many\"").unwrap();

        assert_eq!(load_config_from(&path), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let settings = Settings {
            directory: Some(PathBuf::from("/photos")),
            rename_template: "{date}_{n:03d}".to_string(),
            case_sensitive: true,
            ..Settings::default()
        };

        save_config(&settings, &path).unwrap();
        assert_eq!(load_config_from(&path), settings);
    }
}
