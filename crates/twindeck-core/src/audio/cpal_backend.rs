//! CPAL output backend
//!
//! Provides the concrete source opener and sink used by the player.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  Attach(voice) / AttachMic(tap)  ┌─────────────────────┐
//! │   Key loop       │────────────push()───────────────►│   Command Queue     │
//! │  (CpalBackend)   │                                  │  (lock-free SPSC)   │
//! └──────────────────┘                                  └──────────┬──────────┘
//!     │        ▲                                                   │ pop()
//!     │        │ retired voices / taps                             ▼
//!     │        └──────────────[ Retire Queue ]◄─────── ┌─────────────────────┐
//!     │ Relaxed atomics                                │  CPAL Audio Thread  │
//!     ▼                                                │   (OutputState)     │
//! ┌──────────────────┐                                 │  mixes voices + mic │
//! │ Voice / Levels   │◄────────────────────────────────┤                     │
//! └──────────────────┘                                 └─────────────────────┘
//! ```
//!
//! Released voices and replaced microphone taps travel back through the
//! retire queue, so their buffers are freed on the control thread and never
//! inside the audio callback.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize as CpalBufferSize, SampleFormat, Stream, StreamConfig};
use rtrb::{Consumer, Producer, RingBuffer};

use super::config::{AudioConfig, DeviceId, DEFAULT_SAMPLE_RATE, MAX_BUFFER_SIZE};
use super::decode::decode_file;
use super::device::{available_devices, open_device, Direction};
use super::error::{AudioError, AudioResult};
use super::voice::{Voice, VoiceCursor, VoiceHandle};
use crate::engine::{mic_channel, MicFeed, MicTap, MicrophoneLevels, MIC_QUEUE_CAPACITY};
use crate::sink::Sink;
use crate::source::{AudioSource, SourceOpener};
use crate::types::{ChannelId, DeckSide, StereoSample};

/// Capacity of the command and retire queues
const QUEUE_CAPACITY: usize = 64;

/// Commands sent from the control thread to the output callback
enum OutputCommand {
    /// Start mixing a newly opened voice
    Attach(Arc<Voice>),
    /// Replace the microphone tap
    AttachMic(MicTap),
}

/// Things the callback is done with, returned for deallocation
enum Retired {
    Voice(Arc<Voice>),
    Mic(MicTap),
}

// ─────────────────────────────────────────────────────────────────────────────
// Output Levels
// ─────────────────────────────────────────────────────────────────────────────

/// Channel gains shared with the output callback, stored as f32 bits
pub struct OutputLevels {
    gains: [AtomicU32; 3],
    device_lost: AtomicBool,
}

impl OutputLevels {
    fn new() -> Self {
        Self {
            gains: [
                AtomicU32::new(1.0f32.to_bits()),
                AtomicU32::new(1.0f32.to_bits()),
                AtomicU32::new(1.0f32.to_bits()),
            ],
            device_lost: AtomicBool::new(false),
        }
    }

    #[inline]
    fn slot(channel: ChannelId) -> usize {
        match channel {
            ChannelId::Deck(DeckSide::Left) => 0,
            ChannelId::Deck(DeckSide::Right) => 1,
            ChannelId::Master => 2,
        }
    }

    #[inline]
    pub fn gain(&self, channel: ChannelId) -> f32 {
        f32::from_bits(self.gains[Self::slot(channel)].load(Ordering::Relaxed))
    }

    pub fn set_gain(&self, channel: ChannelId, gain: f32) {
        self.gains[Self::slot(channel)].store(gain.to_bits(), Ordering::Relaxed);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Callback State
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the output callback owns
struct OutputState {
    cursors: Vec<VoiceCursor>,
    mic: Option<MicTap>,
    commands: Consumer<OutputCommand>,
    retired: Producer<Retired>,
    levels: Arc<OutputLevels>,
    sample_rate: u32,
    mix: Vec<StereoSample>,
}

impl OutputState {
    fn new(
        voices: &[Arc<Voice>],
        commands: Consumer<OutputCommand>,
        retired: Producer<Retired>,
        levels: Arc<OutputLevels>,
        sample_rate: u32,
    ) -> Self {
        let mut cursors = Vec::with_capacity(QUEUE_CAPACITY);
        cursors.extend(voices.iter().cloned().map(VoiceCursor::new));
        Self {
            cursors,
            mic: None,
            commands,
            retired,
            levels,
            sample_rate,
            mix: vec![StereoSample::silence(); MAX_BUFFER_SIZE as usize],
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                OutputCommand::Attach(voice) => self.cursors.push(VoiceCursor::new(voice)),
                OutputCommand::AttachMic(tap) => {
                    if let Some(old) = self.mic.replace(tap) {
                        // A full retire queue means the tap is freed here instead
                        let _ = self.retired.push(Retired::Mic(old));
                    }
                }
            }
        }
    }

    /// Hand released voices back to the control thread
    fn retire_released(&mut self) {
        let mut i = 0;
        while i < self.cursors.len() {
            let voice = self.cursors[i].voice();
            if voice.is_released() && self.retired.push(Retired::Voice(voice.clone())).is_ok() {
                self.cursors.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Fill an interleaved output buffer
    fn process(&mut self, data: &mut [f32], channels: usize) {
        self.drain_commands();

        let master = self.levels.gain(ChannelId::Master);
        for block in data.chunks_mut(channels * self.mix.len()) {
            let frames = block.len() / channels;
            let mix = &mut self.mix[..frames];
            mix.fill(StereoSample::silence());

            for cursor in self.cursors.iter_mut() {
                let gain = self.levels.gain(cursor.voice().channel());
                cursor.render(mix, self.sample_rate, gain);
            }
            if let Some(mic) = self.mic.as_mut() {
                for sample in mix.iter_mut() {
                    *sample += mic.next_frame();
                }
            }

            for (frame, sample) in block.chunks_mut(channels).zip(mix.iter()) {
                let sample = sample.scale(master);
                if channels == 1 {
                    frame[0] = (sample.left + sample.right) * 0.5;
                    continue;
                }
                frame[0] = sample.left;
                frame[1] = sample.right;
                // Fill additional channels with silence
                for ch in frame.iter_mut().skip(2) {
                    *ch = 0.0;
                }
            }
        }

        self.retire_released();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A running output stream and the queues into it
struct RunningOutput {
    stream: Stream,
    commands: Producer<OutputCommand>,
    retired: Consumer<Retired>,
}

/// CPAL output device, source opener and sink
///
/// Keeps the output stream alive. Drop or [`Sink::free`] to stop audio.
pub struct CpalBackend {
    config: AudioConfig,
    device: Option<DeviceId>,
    output: Option<RunningOutput>,
    voices: Vec<Arc<Voice>>,
    levels: Arc<OutputLevels>,
    sample_rate: u32,
    buffer_size: u32,
}

impl CpalBackend {
    /// Open the configured output device and start the stream
    pub fn start(config: &AudioConfig) -> AudioResult<Self> {
        let mut backend = Self {
            config: config.clone(),
            device: config.output_device.clone(),
            output: None,
            voices: Vec::new(),
            levels: Arc::new(OutputLevels::new()),
            sample_rate: config.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE),
            buffer_size: 0,
        };
        backend.open_stream()?;
        Ok(backend)
    }

    /// Get the sample rate of the output stream
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the audio latency in milliseconds (one-way, output only)
    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate as f32) * 1000.0
    }

    /// The device currently in use (None = system default)
    pub fn device(&self) -> Option<&DeviceId> {
        self.device.as_ref()
    }

    fn open_stream(&mut self) -> AudioResult<()> {
        self.close_stream();

        let device = open_device(self.device.as_ref(), Direction::Output)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        log::info!("Using audio device: {}", device_name);

        let (supported_config, buffer_size) = get_output_config(&device, &self.config)?;
        let sample_rate = supported_config.sample_rate().0;

        let stream_config = StreamConfig {
            channels: supported_config.channels(),
            sample_rate: supported_config.sample_rate(),
            buffer_size: match buffer_size {
                Some(frames) => CpalBufferSize::Fixed(frames),
                None => CpalBufferSize::Default,
            },
        };

        log::info!(
            "Audio config: {} channels, {}Hz, {} frames",
            stream_config.channels,
            sample_rate,
            buffer_size.map_or_else(|| "default".to_string(), |f| f.to_string())
        );

        let (command_tx, command_rx) = RingBuffer::new(QUEUE_CAPACITY);
        let (retired_tx, retired_rx) = RingBuffer::new(QUEUE_CAPACITY);

        self.voices.retain(|v| !v.is_released());
        let state = OutputState::new(
            &self.voices,
            command_rx,
            retired_tx,
            self.levels.clone(),
            sample_rate,
        );

        self.levels.device_lost.store(false, Ordering::Relaxed);
        let stream = build_output_stream(&device, &stream_config, state, self.levels.clone())?;
        stream
            .play()
            .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

        log::info!("Audio stream started on {}", device_name);

        self.sample_rate = sample_rate;
        self.buffer_size = buffer_size.unwrap_or(0);
        self.output = Some(RunningOutput {
            stream,
            commands: command_tx,
            retired: retired_rx,
        });
        Ok(())
    }

    /// Stop the stream; its callback state is dropped here
    fn close_stream(&mut self) {
        if let Some(output) = self.output.take() {
            if let Err(e) = output.stream.pause() {
                log::debug!("Pausing output stream failed: {}", e);
            }
            drop(output);
            log::info!("Audio stream stopped");
        }
    }

    /// Free whatever the callback has handed back
    fn collect_garbage(&mut self) {
        if let Some(output) = self.output.as_mut() {
            while let Ok(retired) = output.retired.pop() {
                drop(retired);
            }
        }
        self.voices.retain(|v| !v.is_released());
    }

    fn push_command(&mut self, command: OutputCommand) -> bool {
        match self.output.as_mut() {
            Some(output) => match output.commands.push(command) {
                Ok(()) => true,
                Err(rtrb::PushError::Full(_)) => {
                    log::warn!("Output command queue full, command dropped");
                    false
                }
            },
            None => false,
        }
    }

    fn attach(&mut self, voice: Arc<Voice>) {
        self.collect_garbage();
        self.voices.push(voice.clone());
        if !self.push_command(OutputCommand::Attach(voice)) {
            log::debug!("Voice queued for the next output stream");
        }
    }
}

impl SourceOpener for CpalBackend {
    fn open_file(&mut self, path: &Path, channel: ChannelId) -> AudioResult<Box<dyn AudioSource>> {
        let track = decode_file(path)?;
        let voice = Arc::new(Voice::new(channel, track));
        self.attach(voice.clone());
        Ok(Box::new(VoiceHandle::new(voice)))
    }

    /// Only `file://` URLs are playable; streaming needs a network client
    fn open_url(&mut self, url: &str, channel: ChannelId) -> AudioResult<Box<dyn AudioSource>> {
        match url.strip_prefix("file://") {
            Some(path) => self.open_file(Path::new(path), channel),
            None => Err(AudioError::UnsupportedUrl(url.to_string())),
        }
    }
}

impl Sink for CpalBackend {
    fn set_channel_gain(&mut self, channel: ChannelId, gain: f32) {
        self.levels.set_gain(channel, gain);
    }

    fn microphone_feed(&mut self, levels: Arc<MicrophoneLevels>) -> MicFeed {
        self.collect_garbage();
        let (mut feed, tap) = mic_channel(MIC_QUEUE_CAPACITY, levels);
        feed.set_output_rate(self.sample_rate);
        if !self.push_command(OutputCommand::AttachMic(tap)) {
            log::warn!("Microphone not attached: output is not running");
        }
        feed
    }

    fn set_device(&mut self, index: usize) -> AudioResult<()> {
        let devices = available_devices(Direction::Output);
        let device = devices
            .get(index)
            .ok_or_else(|| AudioError::DeviceNotFound(format!("output device #{}", index)))?;
        self.device = Some(device.id.clone());
        self.config.output_device = self.device.clone();
        self.open_stream()
    }

    fn device_names(&self) -> Vec<String> {
        available_devices(Direction::Output)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn device_lost(&self) -> bool {
        self.output.is_none() || self.levels.device_lost.load(Ordering::Relaxed)
    }

    fn free(&mut self) {
        self.close_stream();
        self.voices.clear();
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        self.close_stream();
    }
}

/// Get the best output configuration for a device
///
/// Prefers f32, stereo and the requested sample rate, falling back to any
/// stereo configuration and then to anything the device offers.
fn get_output_config(
    device: &cpal::Device,
    config: &AudioConfig,
) -> AudioResult<(cpal::SupportedStreamConfig, Option<u32>)> {
    let supported_configs: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| AudioError::ConfigError(e.to_string()))?
        .collect();

    let target_sample_rate = config.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
    let in_range = |c: &cpal::SupportedStreamConfigRange| {
        target_sample_rate >= c.min_sample_rate().0 && target_sample_rate <= c.max_sample_rate().0
    };

    let best_config = supported_configs
        .iter()
        .filter(|c| c.sample_format() == SampleFormat::F32)
        .filter(|c| c.channels() >= 2)
        .find(|c| in_range(c))
        .or_else(|| {
            supported_configs
                .iter()
                .filter(|c| c.sample_format() == SampleFormat::F32)
                .find(|c| c.channels() >= 2)
        })
        .or_else(|| {
            supported_configs
                .iter()
                .find(|c| c.sample_format() == SampleFormat::F32)
        })
        .ok_or_else(|| {
            AudioError::ConfigError("No f32 output configuration found".to_string())
        })?;

    let sample_rate = if in_range(best_config) {
        cpal::SampleRate(target_sample_rate)
    } else {
        let fallback = best_config.max_sample_rate();
        log::warn!(
            "Audio device doesn't support {}Hz, falling back to {}Hz",
            target_sample_rate,
            fallback.0
        );
        fallback
    };

    let buffer_size = config.buffer_size.as_frames();
    log::debug!(
        "Selected buffer size: {:?} for {:?} mode",
        buffer_size,
        config.buffer_size
    );

    Ok((best_config.clone().with_sample_rate(sample_rate), buffer_size))
}

/// Build the output stream around the callback state
fn build_output_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut state: OutputState,
    levels: Arc<OutputLevels>,
) -> AudioResult<Stream> {
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                state.process(data, channels);
            },
            move |err| {
                log::error!("Output audio stream error: {}", err);
                if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                    levels.device_lost.store(true, Ordering::Relaxed);
                }
            },
            None,
        )
        .map_err(|e| AudioError::StreamBuildError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode::DecodedTrack;

    fn voice(channel: ChannelId, value: f32, len: usize) -> Arc<Voice> {
        Arc::new(Voice::new(
            channel,
            DecodedTrack {
                frames: vec![StereoSample::mono(value); len].into(),
                sample_rate: 48000,
            },
        ))
    }

    fn state(voices: &[Arc<Voice>]) -> (OutputState, Producer<OutputCommand>, Consumer<Retired>, Arc<OutputLevels>) {
        let (command_tx, command_rx) = RingBuffer::new(QUEUE_CAPACITY);
        let (retired_tx, retired_rx) = RingBuffer::new(QUEUE_CAPACITY);
        let levels = Arc::new(OutputLevels::new());
        let state = OutputState::new(voices, command_rx, retired_tx, levels.clone(), 48000);
        (state, command_tx, retired_rx, levels)
    }

    #[test]
    fn test_mixes_playing_voices_with_channel_and_master_gain() {
        let left = voice(ChannelId::Deck(DeckSide::Left), 0.5, 64);
        let right = voice(ChannelId::Deck(DeckSide::Right), 0.25, 64);
        let mut left_handle = VoiceHandle::new(left.clone());
        let mut right_handle = VoiceHandle::new(right.clone());
        left_handle.play();
        right_handle.play();

        let (mut state, _tx, _rx, levels) = state(&[left, right]);
        levels.set_gain(ChannelId::Deck(DeckSide::Right), 0.0);
        levels.set_gain(ChannelId::Master, 0.5);

        let mut data = vec![0.0f32; 8];
        state.process(&mut data, 2);
        assert!(data.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_attach_command_adds_voice() {
        let (mut state, mut tx, _rx, _levels) = state(&[]);
        let v = voice(ChannelId::Deck(DeckSide::Left), 1.0, 16);
        let mut handle = VoiceHandle::new(v.clone());
        handle.play();
        assert!(tx.push(OutputCommand::Attach(v)).is_ok());

        let mut data = vec![0.0f32; 4];
        state.process(&mut data, 2);
        assert_eq!(data, vec![1.0; 4]);
    }

    #[test]
    fn test_released_voice_is_retired() {
        let v = voice(ChannelId::Deck(DeckSide::Left), 1.0, 16);
        let (mut state, _tx, mut rx, _levels) = state(&[v.clone()]);
        let mut handle = VoiceHandle::new(v);
        handle.release();

        let mut data = vec![0.0f32; 4];
        state.process(&mut data, 2);
        assert!(state.cursors.is_empty());
        assert!(matches!(rx.pop(), Ok(Retired::Voice(_))));
    }

    #[test]
    fn test_extra_channels_are_silent_and_mono_downmixes() {
        let v = voice(ChannelId::Deck(DeckSide::Left), 0.5, 16);
        let mut handle = VoiceHandle::new(v.clone());
        handle.play();
        handle.set_pan(1.0);

        let (mut state, _tx, _rx, _levels) = state(&[v]);
        let mut data = vec![9.0f32; 4];
        state.process(&mut data, 4);
        assert_eq!(data, vec![0.0, 0.5, 0.0, 0.0]);

        let mut mono = vec![0.0f32; 2];
        state.process(&mut mono, 1);
        assert_eq!(mono, vec![0.25, 0.25]);
    }

    #[test]
    fn test_microphone_tap_is_mixed() {
        let (mut state, mut tx, _rx, _levels) = state(&[]);
        let mic_levels = Arc::new(MicrophoneLevels::new());
        mic_levels.set_gain(1.0);
        let (mut feed, tap) = mic_channel(16, mic_levels);
        assert!(tx.push(OutputCommand::AttachMic(tap)).is_ok());
        feed.push(&[0.5, 0.5]);

        let mut data = vec![0.0f32; 6];
        state.process(&mut data, 2);
        assert_eq!(data, vec![0.5, 0.5, 0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_output_levels_slots() {
        let levels = OutputLevels::new();
        levels.set_gain(ChannelId::Deck(DeckSide::Right), 0.3);
        assert_eq!(levels.gain(ChannelId::Deck(DeckSide::Right)), 0.3);
        assert_eq!(levels.gain(ChannelId::Deck(DeckSide::Left)), 1.0);
        assert_eq!(levels.gain(ChannelId::Master), 1.0);
    }
}
