/*
 * Application settings for the interactive tool: the media format families
 * handed to the engine, the console log level, and the last scene that was
 * opened. Settings live as JSON in the application's local config directory;
 * a missing file means defaults.
 *
 * `ConfigManagerOperations` abstracts the storage so the application logic
 * can be tested without touching the user's real configuration directory.
 */
use super::formats::MediaFormats;
use super::path_utils;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

const SETTINGS_FILENAME: &str = "settings.json";
const LAST_SCENE_PATH_FILENAME: &str = "last_scene_path.txt";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoProjectDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration format error: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine a directory for configuration")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub formats: MediaFormats,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            formats: MediaFormats::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}

pub trait ConfigManagerOperations {
    fn load_config(&self, app_name: &str) -> Result<AppConfig>;
    /* Settings are edited by hand; only tests write them. */
    #[cfg(test)]
    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()>;
    fn load_last_scene_path(&self, app_name: &str) -> Result<Option<PathBuf>>;
    fn save_last_scene_path(&self, app_name: &str, scene_path: Option<&Path>) -> Result<()>;
}

/*
 * File-backed settings rooted at a directory. `new()` resolves the platform
 * config directory per call; `with_directory` pins a fixed root.
 */
#[derive(Default)]
pub struct CoreConfigManager {
    fixed_directory: Option<PathBuf>,
}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {
            fixed_directory: None,
        }
    }

    pub fn with_directory(directory: PathBuf) -> Self {
        CoreConfigManager {
            fixed_directory: Some(directory),
        }
    }

    fn config_dir(&self, app_name: &str) -> Result<PathBuf> {
        if let Some(dir) = &self.fixed_directory {
            fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }
        path_utils::get_base_app_config_local_dir(app_name).ok_or(ConfigError::NoProjectDirectory)
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config(&self, app_name: &str) -> Result<AppConfig> {
        let file_path = self.config_dir(app_name)?.join(SETTINGS_FILENAME);
        if !file_path.exists() {
            log::debug!("CoreConfigManager: {file_path:?} does not exist; using defaults.");
            return Ok(AppConfig::default());
        }
        let reader = BufReader::new(File::open(&file_path)?);
        let config: AppConfig = serde_json::from_reader(reader)?;
        log::debug!("CoreConfigManager: Loaded settings from {file_path:?}.");
        Ok(config)
    }

    #[cfg(test)]
    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()> {
        use std::io::{BufWriter, Write};
        let file_path = self.config_dir(app_name)?.join(SETTINGS_FILENAME);
        let mut writer = BufWriter::new(File::create(&file_path)?);
        serde_json::to_writer_pretty(&mut writer, config)?;
        writer.flush()?;
        log::debug!("CoreConfigManager: Saved settings to {file_path:?}.");
        Ok(())
    }

    fn load_last_scene_path(&self, app_name: &str) -> Result<Option<PathBuf>> {
        let file_path = self.config_dir(app_name)?.join(LAST_SCENE_PATH_FILENAME);
        if !file_path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&file_path)?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            log::debug!("CoreConfigManager: {file_path:?} is empty.");
            return Ok(None);
        }
        Ok(Some(PathBuf::from(trimmed)))
    }

    /* `None` clears the stored scene path. */
    fn save_last_scene_path(&self, app_name: &str, scene_path: Option<&Path>) -> Result<()> {
        let file_path = self.config_dir(app_name)?.join(LAST_SCENE_PATH_FILENAME);
        let contents = scene_path
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        fs::write(&file_path, contents)?;
        log::debug!("CoreConfigManager: Stored last scene path {scene_path:?}.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formats::ExtensionSet;
    use tempfile::tempdir;

    const APP: &str = "AnyApp";

    #[test]
    fn test_load_config_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());

        let config = manager.load_config(APP).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_save_and_load_config() {
        // Arrange
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());
        let mut config = AppConfig::default();
        config.log_level = "debug".to_string();
        config.formats.relink_3d = ExtensionSet::new([".usd"]);

        // Act
        manager.save_config(APP, &config).unwrap();
        let loaded = manager.load_config(APP).unwrap();

        // Assert
        assert_eq!(loaded, config);
        assert_eq!(loaded.log_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_partial_settings_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILENAME), r#"{ "log_level": "warn" }"#).unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());

        let config = manager.load_config(APP).unwrap();

        assert_eq!(config.log_level, "warn");
        assert_eq!(config.formats, MediaFormats::default());
    }

    #[test]
    fn test_malformed_settings_is_serde_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILENAME), "not json").unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());
        assert!(matches!(manager.load_config(APP), Err(ConfigError::Serde(_))));
    }

    #[test]
    fn test_last_scene_path_round_trip_and_clear() {
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());
        assert_eq!(manager.load_last_scene_path(APP).unwrap(), None);

        let scene = PathBuf::from("/shows/abc/comp.json");
        manager.save_last_scene_path(APP, Some(&scene)).unwrap();
        assert_eq!(manager.load_last_scene_path(APP).unwrap(), Some(scene));

        manager.save_last_scene_path(APP, None).unwrap();
        assert_eq!(manager.load_last_scene_path(APP).unwrap(), None);
    }

    #[test]
    fn test_platform_config_manager_round_trip() {
        let app_name = format!("AssetManagerTest_Config_{}", rand::random::<u64>());
        let manager = CoreConfigManager::new();
        let Ok(()) = manager.save_last_scene_path(&app_name, Some(Path::new("/tmp/scene.json")))
        else {
            // No platform config directory available.
            return;
        };
        assert_eq!(
            manager.load_last_scene_path(&app_name).unwrap(),
            Some(PathBuf::from("/tmp/scene.json"))
        );
        if let Some(dir) = path_utils::get_base_app_config_local_dir(&app_name) {
            let _ = fs::remove_dir_all(dir);
        }
    }
}
