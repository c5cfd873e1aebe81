//! CPAL audio backend for Twindeck
//!
//! Implements the [`SourceOpener`](crate::source::SourceOpener),
//! [`Sink`](crate::sink::Sink) and
//! [`MicrophoneInput`](crate::sink::MicrophoneInput) capabilities on real
//! hardware.
//!
//! # Architecture
//!
//! The audio system follows a lock-free design for real-time safety:
//!
//! - **Key loop**: Opens voices and sends them to the callback via rtrb
//! - **Output callback**: Owns the voice cursors, mixes decks and microphone
//! - **Capture callback**: Pushes microphone frames through its own ring
//! - **Atomics**: Parameters and positions are shared as relaxed atomics
//!
//! Tracks are decoded fully into memory with Symphonia before they play.
//!
//! # Example Usage
//!
//! ```ignore
//! use twindeck_core::audio::{AudioConfig, CpalBackend};
//!
//! let backend = CpalBackend::start(&AudioConfig::default())?;
//! let console = Console::new(Box::new(backend), None);
//! ```

mod capture;
mod config;
mod cpal_backend;
mod decode;
mod device;
mod error;
mod voice;

pub use capture::CpalMicrophone;
pub use config::{
    AudioConfig, BufferSize, DeviceId, DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE, MAX_BUFFER_SIZE,
};
pub use cpal_backend::{CpalBackend, OutputLevels};
pub use decode::{decode_file, interleaved_to_stereo, DecodedTrack};
pub use device::{available_devices, list_devices, AudioDevice, Direction};
pub use error::{AudioError, AudioResult};
pub use voice::{Voice, VoiceCursor, VoiceHandle};
