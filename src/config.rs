use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reminder::Reminder;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("couldn't parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// everything the app persists: the reminder list plus the display settings,
/// one toml file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub background_color: [f32; 3],
    pub text_color: [f32; 3],
    pub background_image: Option<PathBuf>,
    pub use_24_hour: bool,
    /// starting strictness for new reminders; each reminder's own flag
    /// is what actually drives scheduling
    pub strict_default: bool,
    // last so the toml tables land after the scalar keys
    pub reminders: Vec<Reminder>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            background_color: [
                f32::from(0x99u8) / 255.0,
                f32::from(0x24u8) / 255.0,
                f32::from(0x4fu8) / 255.0,
            ],
            text_color: [1.0, 1.0, 1.0],
            background_image: None,
            use_24_hour: false,
            strict_default: false,
            reminders: vec![],
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// a missing or undecodable file is treated as "no data", not an error
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(
                    "couldn't load config from {}: {err}; starting from defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, raw)?;
        Ok(())
    }

    #[must_use]
    pub fn config_path() -> PathBuf {
        let mut path = directories::ProjectDirs::from("", "", "remind")
            .expect("couldn't get config path")
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        path
    }

    #[must_use]
    pub fn data_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "remind")
            .expect("couldn't get data directory path")
            .data_dir()
            .to_path_buf()
    }

    #[must_use]
    pub fn sounds_path() -> PathBuf {
        Self::data_path().join("sounds")
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reminders = \"not a list").unwrap();
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let mut config = Config::default();
        config.reminders = Reminder::seed();
        config.reminders[1].strict = true;
        config.reminders[2].sound = "bell".to_string();
        config.background_color = [0.1, 0.2, 0.3];
        config.use_24_hour = true;
        config.background_image = Some(PathBuf::from("/tmp/bg.png"));
        config.save(&path).unwrap();
        // same ordered list, same ids, same settings
        assert_eq!(Config::load(&path), config);
    }
}
