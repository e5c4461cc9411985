//! Error types shared across Vid2Vert crates.

use std::path::PathBuf;

/// Top-level error type for Vid2Vert operations.
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    /// Rejected before any engine process is spawned.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A dimension or duration query failed to run or returned garbage.
    #[error("Probe failed: {message}")]
    Probe { message: String },

    /// The transcoding engine failed to start or exited non-zero.
    #[error("Transcode failed: {message}")]
    Transcode {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("Transcode cancelled")]
    Cancelled,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CropError.
pub type CropResult<T> = Result<T, CropError>;

/// Coarse failure buckets used when deciding how to react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    ProbeFailure,
    TranscodeFailure,
    Cancelled,
    Internal,
}

impl CropError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn transcode(msg: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Transcode {
            message: msg.into(),
            exit_code,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Which failure bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } | Self::FileNotFound { .. } => ErrorKind::InvalidInput,
            Self::Probe { .. } => ErrorKind::ProbeFailure,
            Self::Transcode { .. } => ErrorKind::TranscodeFailure,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config { .. } | Self::Io(_) | Self::Json(_) | Self::Other(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_buckets() {
        assert_eq!(
            CropError::invalid_input("no keyframes").kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(CropError::probe("bad output").kind(), ErrorKind::ProbeFailure);
        assert_eq!(
            CropError::transcode("exit 1", Some(1)).kind(),
            ErrorKind::TranscodeFailure
        );
        assert_eq!(CropError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            CropError::FileNotFound {
                path: PathBuf::from("/nope.mp4")
            }
            .kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_display_includes_message() {
        let err = CropError::transcode("ffmpeg exited with status 1", Some(1));
        assert_eq!(err.to_string(), "Transcode failed: ffmpeg exited with status 1");
    }
}
