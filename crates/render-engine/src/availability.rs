//! Engine discovery on the executable search path.

use std::path::PathBuf;

use serde::Serialize;
use vid2vert_common::config::EngineConfig;

/// Where each engine executable was found, if at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineAvailability {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

impl EngineAvailability {
    /// Resolve both configured executables.
    ///
    /// Bare names are looked up on `PATH`; paths must point at an executable.
    pub fn detect(config: &EngineConfig) -> Self {
        let ffmpeg = which::which(&config.ffmpeg).ok();
        let ffprobe = which::which(&config.ffprobe).ok();
        tracing::debug!(?ffmpeg, ?ffprobe, "Detected engine executables");
        Self { ffmpeg, ffprobe }
    }

    /// Both executables are required: probing needs ffprobe, cropping ffmpeg.
    pub fn is_available(&self) -> bool {
        self.ffmpeg.is_some() && self.ffprobe.is_some()
    }

    /// Names of the executables that were not found.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.ffmpeg.is_none() {
            missing.push("ffmpeg");
        }
        if self.ffprobe.is_none() {
            missing.push("ffprobe");
        }
        missing
    }
}
