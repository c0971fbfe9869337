//! Configuration management

use crate::{ReciteError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Interval used when the config does not set one
pub const DEFAULT_INTERVAL_SECS: u32 = 30;

/// Largest interval the three-digit input can express
pub const MAX_INTERVAL_SECS: u32 = 999;

/// Startup settings for speech and playback
///
/// Read from `~/.recite.cfg` (or `--config PATH`). Only the defaults live
/// here; scripts and in-session changes are never written back.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, writing the defaults there if it does not exist
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| ReciteError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| ReciteError::Config(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Default configuration that is not backed by a file
    pub fn in_memory() -> Self {
        Self {
            ini: Self::default_config(),
            path: PathBuf::new(),
        }
    }

    /// Get config file path (~/.recite.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".recite.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("rate", "-1")
            .set("volume", "-1")
            .set("voice", "");

        ini.with_section(Some("playback"))
            .set("interval", DEFAULT_INTERVAL_SECS.to_string());

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i32) -> i32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Speech rate (0-100), `None` for the engine default
    pub fn rate(&self) -> Option<u8> {
        self.get_int("speech", "rate", -1)
            .try_into()
            .ok()
            .filter(|&r| r <= 100)
    }

    /// Speech volume (0-100), `None` for the engine default
    pub fn volume(&self) -> Option<u8> {
        self.get_int("speech", "volume", -1)
            .try_into()
            .ok()
            .filter(|&v| v <= 100)
    }

    /// Preferred voice name (case-insensitive substring match)
    pub fn voice(&self) -> Option<String> {
        let name = self.get_string("speech", "voice", "");
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Pause after each script, in seconds
    pub fn interval(&self) -> u32 {
        self.get_int("playback", "interval", DEFAULT_INTERVAL_SECS as i32)
            .try_into()
            .ok()
            .filter(|&s| s <= MAX_INTERVAL_SECS)
            .unwrap_or(DEFAULT_INTERVAL_SECS)
    }
}
