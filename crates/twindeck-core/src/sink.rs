//! Output sink and microphone capabilities
//!
//! The sink is the physical output: it holds one gain per [`ChannelId`],
//! accepts microphone frames through a [`MicFeed`], and can be moved to a
//! different device. Microphone capture is a separate [`MicrophoneInput`]
//! that pushes into the feed from its own thread.

use std::sync::Arc;

use crate::audio::AudioResult;
use crate::engine::{MicFeed, MicrophoneLevels};
use crate::source::SourceOpener;
use crate::types::ChannelId;

/// The physical output device and its gain stages
pub trait Sink {
    /// Set a channel's gain; master is 0.0 to 1.0
    fn set_channel_gain(&mut self, channel: ChannelId, gain: f32);

    /// Open a fresh microphone push path into the output mix
    ///
    /// Any previous feed is abandoned. Gain and pan are read from `levels`
    /// on the output side.
    fn microphone_feed(&mut self, levels: Arc<MicrophoneLevels>) -> MicFeed;

    /// Switch output to the device at `index` of [`Sink::device_names`]
    fn set_device(&mut self, index: usize) -> AudioResult<()>;

    /// Names of the available output devices
    fn device_names(&self) -> Vec<String>;

    /// Whether the current device has gone away since it was opened
    fn device_lost(&self) -> bool;

    /// Stop output and release the device
    fn free(&mut self);
}

/// Both halves the console needs from an output backend
pub trait AudioBackend: SourceOpener + Sink {
    /// This backend as a plain opener, for handing to a deck
    fn opener(&mut self) -> &mut dyn SourceOpener;
}

impl<T: SourceOpener + Sink> AudioBackend for T {
    fn opener(&mut self) -> &mut dyn SourceOpener {
        self
    }
}

/// Live microphone capture
pub trait MicrophoneInput {
    /// Begin capturing into `feed`
    fn start(&mut self, feed: MicFeed) -> AudioResult<()>;

    /// Stop capturing
    ///
    /// Returns only once the capture callback can no longer run.
    fn stop(&mut self);

    /// Switch to the input device at `index` of [`MicrophoneInput::device_names`]
    ///
    /// Takes effect on the next [`MicrophoneInput::start`].
    fn set_device(&mut self, index: usize) -> AudioResult<()>;

    /// Names of the available input devices
    fn device_names(&self) -> Vec<String>;
}
