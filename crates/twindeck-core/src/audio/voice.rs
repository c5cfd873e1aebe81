//! Voices - decoded tracks playing through the output callback
//!
//! A [`Voice`] is shared between the control thread, which owns it through a
//! [`VoiceHandle`] (the deck's [`AudioSource`]), and the output callback,
//! which reads it through a [`VoiceCursor`]. Every parameter is a single-word
//! atomic, so neither side ever waits for the other.
//!
//! Seeking goes through a request slot: the control thread stores the target,
//! and the callback swaps it out at the start of its next buffer.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use super::decode::DecodedTrack;
use crate::source::AudioSource;
use crate::types::{pan_gains, ChannelId, StereoSample, DEFAULT_FREQUENCY};

/// Empty seek request slot
const NO_SEEK: u64 = u64::MAX;

/// Playback state of one decoded track
pub struct Voice {
    channel: ChannelId,
    track: DecodedTrack,
    playing: AtomicBool,
    released: AtomicBool,
    position: AtomicU64,
    seek_request: AtomicU64,
    volume: AtomicU32,
    pan: AtomicU32,
    frequency: AtomicU32,
}

impl Voice {
    /// A paused voice at the start of the track, natural speed, unity volume
    pub fn new(channel: ChannelId, track: DecodedTrack) -> Self {
        Self {
            channel,
            track,
            playing: AtomicBool::new(false),
            released: AtomicBool::new(false),
            position: AtomicU64::new(0),
            seek_request: AtomicU64::new(NO_SEEK),
            volume: AtomicU32::new(1.0f32.to_bits()),
            pan: AtomicU32::new(0.0f32.to_bits()),
            frequency: AtomicU32::new(DEFAULT_FREQUENCY.to_bits()),
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn length(&self) -> u64 {
        self.track.len()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Relaxed)
    }

    /// Position in ticks, including a seek the callback has not applied yet
    pub fn position(&self) -> u64 {
        match self.seek_request.load(Ordering::Relaxed) {
            NO_SEEK => self.position.load(Ordering::Relaxed),
            pending => pending,
        }
    }

    #[inline]
    fn load_f32(cell: &AtomicU32) -> f32 {
        f32::from_bits(cell.load(Ordering::Relaxed))
    }

    #[inline]
    fn store_f32(cell: &AtomicU32, value: f32) {
        cell.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Control-side owner of a voice
pub struct VoiceHandle {
    voice: Arc<Voice>,
}

impl VoiceHandle {
    pub fn new(voice: Arc<Voice>) -> Self {
        Self { voice }
    }
}

impl AudioSource for VoiceHandle {
    fn play(&mut self) {
        self.voice.playing.store(true, Ordering::Relaxed);
    }

    fn pause(&mut self) {
        self.voice.playing.store(false, Ordering::Relaxed);
    }

    fn set_volume(&mut self, volume: f32) {
        Voice::store_f32(&self.voice.volume, volume);
    }

    fn set_pan(&mut self, pan: f32) {
        Voice::store_f32(&self.voice.pan, pan);
    }

    fn set_frequency(&mut self, frequency: f32) {
        Voice::store_f32(&self.voice.frequency, frequency);
    }

    fn position(&self) -> u64 {
        self.voice.position()
    }

    fn set_position(&mut self, position: u64) {
        let position = position.min(self.voice.length().saturating_sub(1));
        self.voice.seek_request.store(position, Ordering::Relaxed);
    }

    fn length(&self) -> u64 {
        self.voice.length()
    }

    fn release(&mut self) {
        self.voice.playing.store(false, Ordering::Relaxed);
        self.voice.released.store(true, Ordering::Relaxed);
    }
}

impl Drop for VoiceHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Callback-side reader of a voice
pub struct VoiceCursor {
    voice: Arc<Voice>,
    position: f64,
}

impl VoiceCursor {
    pub fn new(voice: Arc<Voice>) -> Self {
        let position = voice.position() as f64;
        Self { voice, position }
    }

    pub fn voice(&self) -> &Arc<Voice> {
        &self.voice
    }

    /// Mix this voice into `out`, scaled by its channel gain
    ///
    /// The source advances `frequency / 44100 * native_rate / output_rate`
    /// frames per output frame, with linear interpolation between frames.
    /// Reaching the end stops the voice.
    pub fn render(&mut self, out: &mut [StereoSample], output_rate: u32, channel_gain: f32) {
        let voice = &*self.voice;
        let seek = voice.seek_request.swap(NO_SEEK, Ordering::Relaxed);
        if seek != NO_SEEK {
            self.position = seek as f64;
        }

        let frames = &voice.track.frames;
        let len = frames.len();

        if voice.is_playing() && len > 0 {
            let frequency = Voice::load_f32(&voice.frequency) as f64;
            let step = frequency / DEFAULT_FREQUENCY as f64 * voice.track.sample_rate as f64
                / output_rate.max(1) as f64;
            let gain = Voice::load_f32(&voice.volume) * channel_gain;
            let (pan_left, pan_right) = pan_gains(Voice::load_f32(&voice.pan));

            for slot in out.iter_mut() {
                let index = self.position as usize;
                if index >= len {
                    self.position = len as f64;
                    voice.playing.store(false, Ordering::Relaxed);
                    break;
                }
                let current = frames[index];
                let next = frames.get(index + 1).copied().unwrap_or(current);
                let sample = current.lerp(next, (self.position - index as f64) as f32);
                *slot += StereoSample::new(
                    sample.left * gain * pan_left,
                    sample.right * gain * pan_right,
                );
                self.position += step;
            }
        }

        let published = (self.position as u64).min(len as u64);
        voice.position.store(published, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeckSide;

    fn ramp(len: usize, sample_rate: u32) -> Arc<Voice> {
        let frames: Vec<StereoSample> = (0..len).map(|i| StereoSample::mono(i as f32)).collect();
        Arc::new(Voice::new(
            ChannelId::Deck(DeckSide::Left),
            DecodedTrack {
                frames: frames.into(),
                sample_rate,
            },
        ))
    }

    #[test]
    fn test_paused_voice_is_silent() {
        let voice = ramp(16, 44100);
        let mut cursor = VoiceCursor::new(voice.clone());
        let mut out = vec![StereoSample::silence(); 4];
        cursor.render(&mut out, 44100, 1.0);
        assert!(out.iter().all(|s| *s == StereoSample::silence()));
        assert_eq!(voice.position(), 0);
    }

    #[test]
    fn test_natural_speed_advances_one_frame_per_frame() {
        let voice = ramp(16, 44100);
        let mut handle = VoiceHandle::new(voice.clone());
        let mut cursor = VoiceCursor::new(voice.clone());
        handle.play();

        let mut out = vec![StereoSample::silence(); 4];
        cursor.render(&mut out, 44100, 1.0);
        assert_eq!(out[3], StereoSample::mono(3.0));
        assert_eq!(handle.position(), 4);
    }

    #[test]
    fn test_frequency_scales_rate() {
        let voice = ramp(64, 44100);
        let mut handle = VoiceHandle::new(voice.clone());
        let mut cursor = VoiceCursor::new(voice.clone());
        handle.set_frequency(88200.0);
        handle.play();

        let mut out = vec![StereoSample::silence(); 4];
        cursor.render(&mut out, 44100, 1.0);
        assert_eq!(out[2], StereoSample::mono(4.0));
        assert_eq!(handle.position(), 8);
    }

    #[test]
    fn test_native_rate_is_respected() {
        // A 22050Hz track on a 44100Hz output advances half a frame per frame
        let voice = ramp(16, 22050);
        let mut handle = VoiceHandle::new(voice.clone());
        let mut cursor = VoiceCursor::new(voice.clone());
        handle.play();

        let mut out = vec![StereoSample::silence(); 4];
        cursor.render(&mut out, 44100, 1.0);
        assert_eq!(out[1], StereoSample::mono(0.5));
        assert_eq!(handle.position(), 2);
    }

    #[test]
    fn test_gain_and_pan_applied() {
        let voice = ramp(8, 44100);
        let mut handle = VoiceHandle::new(voice.clone());
        let mut cursor = VoiceCursor::new(voice.clone());
        handle.set_volume(0.5);
        handle.set_pan(-1.0);
        handle.set_position(2);
        handle.play();

        let mut out = vec![StereoSample::silence(); 1];
        cursor.render(&mut out, 44100, 0.5);
        assert_eq!(out[0], StereoSample::new(0.5, 0.0));
    }

    #[test]
    fn test_seek_is_visible_before_callback_runs() {
        let voice = ramp(100, 44100);
        let mut handle = VoiceHandle::new(voice.clone());
        handle.set_position(500);
        assert_eq!(handle.position(), 99);
    }

    #[test]
    fn test_end_of_track_stops_voice() {
        let voice = ramp(3, 44100);
        let mut handle = VoiceHandle::new(voice.clone());
        let mut cursor = VoiceCursor::new(voice.clone());
        handle.play();

        let mut out = vec![StereoSample::silence(); 8];
        cursor.render(&mut out, 44100, 1.0);
        assert!(!voice.is_playing());
        assert_eq!(handle.position(), 3);
        assert_eq!(out[5], StereoSample::silence());
    }

    #[test]
    fn test_drop_releases() {
        let voice = ramp(3, 44100);
        drop(VoiceHandle::new(voice.clone()));
        assert!(voice.is_released());
    }
}
