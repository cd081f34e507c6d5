//! User settings persistence via TOML.
//!
//! Settings are stored at `<config_dir>/yv/settings.toml`.
//! Missing or corrupted config files return sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// User-configurable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Playback pace in frames per second. Zero disables pacing.
    pub frame_rate: u32,
    /// Name of the command channel shared by synchronized viewers.
    pub channel_key: String,
    /// Directory for channel sockets (unset = per-user runtime dir).
    pub channel_dir: Option<PathBuf>,
    /// How long a follower waits on local input before checking the channel.
    pub follower_poll_ms: u64,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_rate: 25,
            channel_key: yv_protocol::CHANNEL_KEY.to_string(),
            channel_dir: None,
            follower_poll_ms: 20,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default config path.
    ///
    /// Returns defaults if the file doesn't exist or is corrupted.
    pub fn load() -> Self {
        Self::load_from_dir(Self::config_dir())
    }

    /// Load settings from a specific config directory.
    pub fn load_from_dir(config_dir: PathBuf) -> Self {
        let path = config_dir.join("settings.toml");
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => {
                    tracing::info!(path = %path.display(), "settings loaded");
                    settings
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "corrupted settings file, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "settings file not found, using defaults"
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read settings file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save settings to a specific config directory.
    pub fn save_to_dir(&self, config_dir: PathBuf) -> Result<()> {
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let path = config_dir.join("settings.toml");
        let contents = toml::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(&path, &contents)
            .with_context(|| format!("failed to write settings file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Time budget for one frame during playback.
    pub fn frame_budget(&self) -> Duration {
        if self.frame_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / self.frame_rate
        }
    }

    pub fn follower_poll(&self) -> Duration {
        Duration::from_millis(self.follower_poll_ms)
    }

    /// Get the default config directory.
    pub fn config_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "yv")
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("yv-config"))
    }
}
