//! Audio backend error types

use thiserror::Error;

/// Errors that can occur during audio operations
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio devices available
    #[error("No audio {0} devices found")]
    NoDevices(&'static str),

    /// Failed to get default device
    #[error("Failed to get default audio device: {0}")]
    NoDefaultDevice(String),

    /// Device not found
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Failed to get device configuration
    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    /// Failed to build audio stream
    #[error("Failed to build audio stream: {0}")]
    StreamBuildError(String),

    /// Failed to start/play stream
    #[error("Failed to start audio stream: {0}")]
    StreamPlayError(String),

    /// Output is not running (freed, or never opened)
    #[error("Audio output is not running")]
    NotRunning,

    /// Track file could not be read
    #[error("Failed to open {path}: {reason}")]
    Io { path: String, reason: String },

    /// Track could not be decoded
    #[error("Failed to decode audio: {0}")]
    DecodeError(String),

    /// Unsupported sample or container format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// URL scheme the backend cannot stream
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),
}

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;
