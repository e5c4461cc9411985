//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CropError, CropResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External engine executables.
    pub engine: EngineConfig,

    /// Destination naming.
    pub output: OutputConfig,

    /// What to do when a transcode job fails.
    pub failure_policy: FailurePolicy,

    /// Preview server settings.
    pub preview: PreviewConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Locations of the two engine executables.
///
/// Either a bare program name resolved through `PATH` or a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// Output file naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prefix prepended to the source file name.
    pub prefix: String,
}

/// Reaction to a failed transcode job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the failure and keep the host running.
    #[default]
    Surface,
    /// Report the failure and shut the host down.
    Terminate,
    /// Re-run the job up to `attempts` more times before surfacing.
    Retry { attempts: u32 },
}

/// Preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Socket address to bind. Port 0 picks an ephemeral port.
    pub bind: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vid2vert=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "cropped_".to_string(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:0".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit file. Unlike [`AppConfig::load`], errors are returned.
    pub fn load_from(path: &Path) -> CropResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CropError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| CropError::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("vid2vert").join("config.json")
}
