//! Audio source capability
//!
//! A deck never decodes anything itself. It asks a [`SourceOpener`] for an
//! [`AudioSource`] and drives it through the primitives below. Positions and
//! lengths are in ticks: sample frames at the source's native rate.

use std::path::Path;

use crate::audio::AudioResult;
use crate::types::ChannelId;

/// One open, playable track
pub trait AudioSource: Send {
    /// Start or resume playback from the current position
    fn play(&mut self);

    /// Stop advancing, keeping the position
    fn pause(&mut self);

    /// Source trim, 0.0 to 1.0
    fn set_volume(&mut self, volume: f32);

    /// Balance, -1.0 (left) to 1.0 (right)
    fn set_pan(&mut self, pan: f32);

    /// Playback rate; 44100 plays at natural speed
    fn set_frequency(&mut self, frequency: f32);

    /// Current playback offset in ticks
    fn position(&self) -> u64;

    /// Move the playback offset
    fn set_position(&mut self, position: u64);

    /// Total length in ticks
    fn length(&self) -> u64;

    /// Stop and give back any resources held on the output side
    ///
    /// Safe to call more than once.
    fn release(&mut self);
}

/// Opens local files and streams as [`AudioSource`]s
pub trait SourceOpener {
    /// Open a local file, routed through `channel` on the sink
    fn open_file(&mut self, path: &Path, channel: ChannelId) -> AudioResult<Box<dyn AudioSource>>;

    /// Open a URL, routed through `channel` on the sink
    fn open_url(&mut self, url: &str, channel: ChannelId) -> AudioResult<Box<dyn AudioSource>>;
}
