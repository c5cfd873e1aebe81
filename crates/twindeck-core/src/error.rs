//! Console error types

use thiserror::Error;

use crate::audio::AudioError;

/// Errors surfaced to whoever drives the console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// A track could not be opened; the deck keeps what it had
    #[error("Could not load {source_ref}: {reason}")]
    SourceUnavailable { source_ref: String, reason: String },

    /// The output or input device went away or could not be opened
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),
}

impl ConsoleError {
    /// Wrap an open failure for the given path or URL
    pub fn source_unavailable(source_ref: impl Into<String>, err: &AudioError) -> Self {
        Self::SourceUnavailable {
            source_ref: source_ref.into(),
            reason: err.to_string(),
        }
    }
}

impl From<AudioError> for ConsoleError {
    fn from(err: AudioError) -> Self {
        Self::DeviceUnavailable(err.to_string())
    }
}

/// Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
