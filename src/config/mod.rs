//! Configuration module for TagTrace
//!
//! This module handles the kiosk configuration:
//! - Serial link parameters (port, baud rate, polling)
//! - Location of the visit database
//! - UI language, fonts and window size
//! - Log file output
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.tagtrace.kiosk/`
//! - **macOS**: `~/Library/Application Support/dev.tagtrace.kiosk/`
//! - **Windows**: `%APPDATA%\dev.tagtrace.kiosk\`
//!
//! # Files
//!
//! - `config.toml` - Kiosk configuration, written with defaults on first start
//! - `tagtrace.db` - Default SQLite visit database
//! - `logs/` - Daily rolling log files
//!
//! # Example
//!
//! ```ignore
//! use tagtrace_rs::config::AppConfig;
//!
//! let config = AppConfig::load_or_default();
//! println!("reading tags from {} @ {}", config.serial.port, config.serial.baud_rate);
//! ```

use crate::error::{Result, TagTraceError};
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.tagtrace.kiosk";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default database filename
pub const DATABASE_FILE: &str = "tagtrace.db";

/// Log directory name inside the app data directory
pub const LOG_DIR: &str = "logs";

/// Default baud rate of the tag reader firmware
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default serial read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Default idle poll interval of the reader loop in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default serial device for the platform
pub fn default_serial_port() -> String {
    if cfg!(windows) {
        "COM3".to_string()
    } else {
        "/dev/ttyACM0".to_string()
    }
}

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        TagTraceError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            TagTraceError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== App Config ====================

/// Complete kiosk configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Serial link to the tag reader
    #[serde(default)]
    pub serial: SerialConfig,

    /// Visit database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load config from the default location
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            TagTraceError::Config("Could not determine config path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TagTraceError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            TagTraceError::Config(format!("Failed to parse config {:?}: {}", path, e))
        })
    }

    /// Load config, returning defaults on any error
    ///
    /// On first start the defaults are written out so they can be edited.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => {
                if config_path().is_some_and(|p| !p.exists()) {
                    if let Err(e) = config.save() {
                        tracing::warn!("Failed to write default config: {}", e);
                    }
                }
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(CONFIG_FILE))
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TagTraceError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TagTraceError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            TagTraceError::Config(format!("Failed to write config {:?}: {}", path, e))
        })
    }
}

// ==================== Serial Config ====================

/// Serial link parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    /// Device path or COM port name
    pub port: String,

    /// Baud rate
    pub baud_rate: u32,

    /// Read timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// How long the reader sleeps when no input is waiting
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ==================== Database Config ====================

/// Visit database location
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DatabaseConfig {
    /// SQLite file; `None` means `tagtrace.db` in the app data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file path
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => app_data_dir()
                .map(|dir| dir.join(DATABASE_FILE))
                .unwrap_or_else(|| PathBuf::from(DATABASE_FILE)),
        }
    }
}

// ==================== UI Config ====================

/// Window and display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Display language
    #[serde(default)]
    pub language: Language,

    /// Font scale factor
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,

    /// Font file with Hangul glyphs; system fonts are searched when unset
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// Initial window size
    #[serde(default = "default_window_size")]
    pub window_size: [f32; 2],
}

fn default_font_scale() -> f32 {
    1.0
}

fn default_window_size() -> [f32; 2] {
    [600.0, 600.0]
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            font_scale: default_font_scale(),
            font_path: None,
            window_size: default_window_size(),
        }
    }
}

// ==================== Logging Config ====================

/// Log file output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Write a daily rolling log file next to the config
    #[serde(default = "default_true")]
    pub file_enabled: bool,

    /// Log directory; `logs/` in the app data directory when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: true,
            directory: None,
        }
    }
}

impl LoggingConfig {
    /// Resolve the log directory, if one can be determined
    pub fn resolved_directory(&self) -> Option<PathBuf> {
        self.directory
            .clone()
            .or_else(|| app_data_dir().map(|dir| dir.join(LOG_DIR)))
    }
}

// ==================== Tests ====================
