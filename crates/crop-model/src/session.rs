//! Editing session: the video currently opened by the host.
//!
//! A [`Session`] is shared between the host and the preview server. Cloning
//! it is cheap and every clone observes the same opened video.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use vid2vert_common::error::{CropError, CropResult};

/// File extensions accepted by [`Session::open`], lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "flv", "wmv", "webm"];

/// Description of a freshly opened video, as returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedVideo {
    /// File name without directory.
    pub name: String,
    /// Containing directory.
    pub location: PathBuf,
    /// Absolute path to the file.
    pub full_path: PathBuf,
    /// RFC 3339 timestamp of when the video was opened.
    pub opened_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    current: Arc<RwLock<Option<PathBuf>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `path` the current video.
    ///
    /// The file must exist and carry one of [`SUPPORTED_EXTENSIONS`]
    /// (compared case-insensitively). Any previously opened video is replaced.
    pub fn open(&self, path: &Path) -> CropResult<OpenedVideo> {
        if !path.is_file() {
            return Err(CropError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        if !is_supported_video(path) {
            return Err(CropError::invalid_input(format!(
                "unsupported video type: {}",
                path.display()
            )));
        }

        let full_path = std::fs::canonicalize(path)?;
        let name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CropError::invalid_input("path has no file name"))?;
        let location = full_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(full_path.clone());
        tracing::info!(path = %full_path.display(), "Opened video");

        Ok(OpenedVideo {
            name,
            location,
            full_path,
            opened_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Path of the current video, if any.
    pub fn current(&self) -> Option<PathBuf> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn reset(&self) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Whether the file extension is one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
