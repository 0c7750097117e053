//! TOML-based configuration persistence for the keyboard monitor.
//!
//! The monitor's settings and recorded bindings live in one file per user:
//! - Windows:  `%APPDATA%\Keycap\config.toml`
//! - Linux:    `~/.config/keycap/config.toml`
//! - macOS:    `~/Library/Application Support/Keycap/config.toml`
//!
//! # Example file (for beginners)
//!
//! ```toml
//! [general]
//! log_level = "info"
//!
//! [input]
//! backend = "auto"
//! poll_interval_ms = 10
//! device_dir = "/dev/input"
//! roundtrip_timeout_ms = 2000
//!
//! [[bindings]]
//! action = "pause"
//! binding = "SC 29+SC 25"
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration.  Bindings are stored by ScanCode number rather than by key
//! name, which keeps them stable across keyboard layouts and platforms.
//!
//! The `KEYCAP_BACKEND` environment variable overrides `input.backend` after
//! the file is loaded; see [`apply_env_overrides`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use keycap_core::KeyBinding;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::input_capture::BackendKind;

/// Environment variable that overrides [`InputConfig::backend`].
pub const BACKEND_ENV_VAR: &str = "KEYCAP_BACKEND";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Failure while loading, saving or overriding the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `APPDATA`, `XDG_CONFIG_HOME` nor `HOME` is usable.
    #[error("no per-user configuration directory on this system")]
    NoPlatformConfigDir,

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `KEYCAP_BACKEND` holds an unknown backend name.
    #[error("invalid {BACKEND_ENV_VAR} value {0:?}")]
    InvalidBackend(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Everything stored in `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Keyboard capture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Restricts backend selection to one kind.  `auto` tries every tier.
    #[serde(default)]
    pub backend: BackendPreference,
    /// Delay between two `get_events` calls in the monitor loop.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Directory scanned and watched for raw input device nodes.
    #[serde(default = "default_device_dir")]
    pub device_dir: PathBuf,
    /// Upper bound for each start-up round-trip with the compositor.
    #[serde(default = "default_roundtrip_timeout_ms")]
    pub roundtrip_timeout_ms: u64,
}

/// A named action bound to a key combination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindingEntry {
    pub action: String,
    pub binding: KeyBinding,
}

/// Which backend the user asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendPreference {
    #[default]
    Auto,
    RawDevice,
    Compositor,
    LegacyDisplay,
    NativeHook,
}

impl BackendPreference {
    /// Returns `true` if a backend of `kind` may be selected.
    pub fn allows(self, kind: BackendKind) -> bool {
        match self {
            BackendPreference::Auto => true,
            BackendPreference::RawDevice => kind == BackendKind::RawDevice,
            BackendPreference::Compositor => kind == BackendKind::Compositor,
            BackendPreference::LegacyDisplay => kind == BackendKind::LegacyDisplay,
            BackendPreference::NativeHook => kind == BackendKind::NativeHook,
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendPreference::Auto => "auto",
            BackendPreference::RawDevice => "raw-device",
            BackendPreference::Compositor => "compositor",
            BackendPreference::LegacyDisplay => "legacy-display",
            BackendPreference::NativeHook => "native-hook",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendPreference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "raw-device" | "evdev" => Ok(BackendPreference::RawDevice),
            "compositor" | "wayland" => Ok(BackendPreference::Compositor),
            "legacy-display" | "x11" => Ok(BackendPreference::LegacyDisplay),
            "native-hook" | "windows" => Ok(BackendPreference::NativeHook),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

impl InputConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn roundtrip_timeout(&self) -> Duration {
        Duration::from_millis(self.roundtrip_timeout_ms)
    }
}

// ── Defaults ──────────────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_poll_interval_ms() -> u64 {
    10
}
fn default_device_dir() -> PathBuf {
    PathBuf::from("/dev/input")
}
fn default_roundtrip_timeout_ms() -> u64 {
    2000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::default(),
            poll_interval_ms: default_poll_interval_ms(),
            device_dir: default_device_dir(),
            roundtrip_timeout_ms: default_roundtrip_timeout_ms(),
        }
    }
}

// ── Environment overrides ─────────────────────────────────────────────────────

/// Applies `KEYCAP_BACKEND` (if set and non-empty) on top of `config`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBackend`] for an unrecognized value.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<(), ConfigError> {
    apply_backend_override(config, std::env::var(BACKEND_ENV_VAR).ok().as_deref())
}

fn apply_backend_override(config: &mut AppConfig, value: Option<&str>) -> Result<(), ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => {
            config.input.backend = v.parse()?;
            Ok(())
        }
        _ => Ok(()),
    }
}

// ── File access ───────────────────────────────────────────────────────────────

/// Per-user `Keycap` directory (see the module docs for each platform).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    user_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Reads the per-user file.  A missing file yields the defaults; any other
/// read failure or malformed TOML is an error.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(config_file_path()?)
}

/// Loads `AppConfig` from an explicit path.
pub fn load_config_from(path: PathBuf) -> Result<AppConfig, ConfigError> {
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default())
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    Ok(toml::from_str(&text)?)
}

/// Writes `config` to the per-user file, replacing its contents.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, config_file_path()?)
}

/// Persists `config` to an explicit path, creating parent directories.
pub fn save_config_to(config: &AppConfig, path: PathBuf) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&path, text).map_err(|source| ConfigError::Io { path, source })?;
    Ok(())
}

fn user_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Keycap"))
    }

    #[cfg(target_os = "linux")]
    {
        match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            Some(xdg) => Some(PathBuf::from(xdg).join("keycap")),
            None => std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/keycap")),
        }
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Keycap")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
