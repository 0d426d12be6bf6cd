use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The container holds no decodable audio track.
    #[error("No audio track in {0}")]
    NoAudioTrack(PathBuf),

    /// Unsupported audio format.
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Audio decode error.
    #[error("Decode error: {0}")]
    DecodeError(String),
}
