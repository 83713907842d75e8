//! Configuration file handling
//!
//! The config lives at `<config dir>/srtp/config.toml` unless `SRTP_CONFIG`
//! points elsewhere. Every field has a default, so a partial (or missing)
//! file is fine.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::player::poller::{DEFAULT_JOIN_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::player::{SessionOptions, DEFAULT_DURATION_SECS, DEFAULT_SYNC_OFFSET};
use crate::subtitle::DEFAULT_ENCODINGS;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SRTP_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub playback: PlaybackConfig,
    pub subtitles: SubtitlesConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

/// Subtitle timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds subtracted from the playback position before lookup
    pub offset_secs: f64,
    /// Sampling interval of the background poller
    pub poll_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            offset_secs: DEFAULT_SYNC_OFFSET,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Track length assumed when it can't be read from the file
    pub default_duration_secs: f64,
    /// Step for relative seeks (arrow keys)
    pub seek_step_secs: f64,
    /// How long to wait for a previous poller to exit
    pub poller_join_timeout_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_DURATION_SECS,
            seek_step_secs: 5.0,
            poller_join_timeout_ms: DEFAULT_JOIN_TIMEOUT.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitlesConfig {
    /// Encodings tried in order when decoding a subtitle file
    pub encodings: Vec<String>,
}

impl Default for SubtitlesConfig {
    fn default() -> Self {
        Self {
            encodings: DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Keep the history view scrolled to the newest entry
    pub autoscroll: bool,
    /// Redraw/input tick of the TUI
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            autoscroll: true,
            tick_rate_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path; defaults to `<data dir>/srtp/srtp.log`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load the config file, or defaults when it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Location of the config file.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("srtp").join("config.toml"))
    }

    /// Write this config to the config file, creating its directory.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Log file location: configured, or under the data directory.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log
            .file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("srtp").join("srtp.log")))
    }

    /// Session tunables derived from this config.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            sync_offset: self.sync.offset_secs,
            poll_interval: Duration::from_millis(self.sync.poll_interval_ms.max(1)),
            join_timeout: Duration::from_millis(self.playback.poller_join_timeout_ms),
            default_duration: self.playback.default_duration_secs,
            encodings: self.subtitles.encodings.clone(),
        }
    }
}
