//! Error types shared across Mixcut crates.

use std::path::PathBuf;

/// Top-level error type for Mixcut operations.
#[derive(Debug, thiserror::Error)]
pub enum MixcutError {
    #[error("Playback error: {message}")]
    Playback { message: String },

    #[error("Compositor error: {message}")]
    Compositor { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Interaction error: {message}")]
    Interaction { message: String },

    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output surface unavailable: {message}")]
    SurfaceUnavailable { message: String },

    #[error("Media asset not found: {asset_id}")]
    MissingAsset { asset_id: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MixcutError.
pub type MixcutResult<T> = Result<T, MixcutError>;

impl MixcutError {
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback {
            message: msg.into(),
        }
    }

    pub fn compositor(msg: impl Into<String>) -> Self {
        Self::Compositor {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio {
            message: msg.into(),
        }
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable {
            message: msg.into(),
        }
    }

    pub fn missing_asset(asset_id: impl Into<String>) -> Self {
        Self::MissingAsset {
            asset_id: asset_id.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
