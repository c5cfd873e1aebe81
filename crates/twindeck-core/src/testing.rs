//! In-memory doubles for the audio capabilities, used by unit tests

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::audio::{AudioError, AudioResult};
use crate::engine::{mic_channel, MicFeed, MicTap, MicrophoneLevels, MIC_QUEUE_CAPACITY};
use crate::sink::{MicrophoneInput, Sink};
use crate::source::{AudioSource, SourceOpener};
use crate::types::ChannelId;

/// Everything a mock source has been told
#[derive(Debug, Default)]
pub struct SourceLog {
    pub source_ref: String,
    pub channel: Option<ChannelId>,
    pub playing: bool,
    pub volume: f32,
    pub pan: f32,
    pub frequency: f32,
    pub position: u64,
    pub length: u64,
    pub released: bool,
}

pub type SharedSource = Arc<Mutex<SourceLog>>;

pub struct MockSource {
    state: SharedSource,
}

impl AudioSource for MockSource {
    fn play(&mut self) {
        self.state.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().playing = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }

    fn set_pan(&mut self, pan: f32) {
        self.state.lock().unwrap().pan = pan;
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.state.lock().unwrap().frequency = frequency;
    }

    fn position(&self) -> u64 {
        self.state.lock().unwrap().position
    }

    fn set_position(&mut self, position: u64) {
        self.state.lock().unwrap().position = position;
    }

    fn length(&self) -> u64 {
        self.state.lock().unwrap().length
    }

    fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.playing = false;
        state.released = true;
    }
}

/// Shared record of a mock backend's sink side and opened sources
#[derive(Default)]
pub struct BackendLog {
    pub sources: Vec<SharedSource>,
    pub fail_open: bool,
    pub length: u64,
    pub gains: HashMap<ChannelId, f32>,
    pub devices: Vec<String>,
    pub device: usize,
    pub fail_set_device: bool,
    pub device_lost: bool,
    pub feeds_opened: usize,
    pub tap: Option<MicTap>,
    pub freed: bool,
}

impl BackendLog {
    pub fn source(&self, index: usize) -> std::sync::MutexGuard<'_, SourceLog> {
        self.sources[index].lock().unwrap()
    }

    pub fn gain(&self, channel: ChannelId) -> f32 {
        self.gains.get(&channel).copied().unwrap_or(f32::NAN)
    }
}

pub type SharedBackend = Arc<Mutex<BackendLog>>;

/// Opener and sink in one, recording everything into a [`BackendLog`]
pub struct MockBackend {
    shared: SharedBackend,
}

impl MockBackend {
    /// Sources opened by this backend report `length` ticks
    pub fn new(length: u64) -> (Self, SharedBackend) {
        let shared = Arc::new(Mutex::new(BackendLog {
            length,
            devices: vec!["Speakers".to_string(), "Headphones".to_string()],
            ..Default::default()
        }));
        (Self { shared: shared.clone() }, shared)
    }

    fn open(&mut self, source_ref: &str, channel: ChannelId) -> AudioResult<Box<dyn AudioSource>> {
        let mut log = self.shared.lock().unwrap();
        if log.fail_open {
            return Err(AudioError::UnsupportedFormat(source_ref.to_string()));
        }
        let state = Arc::new(Mutex::new(SourceLog {
            source_ref: source_ref.to_string(),
            channel: Some(channel),
            length: log.length,
            ..Default::default()
        }));
        log.sources.push(state.clone());
        Ok(Box::new(MockSource { state }))
    }
}

impl SourceOpener for MockBackend {
    fn open_file(&mut self, path: &Path, channel: ChannelId) -> AudioResult<Box<dyn AudioSource>> {
        self.open(&path.to_string_lossy(), channel)
    }

    fn open_url(&mut self, url: &str, channel: ChannelId) -> AudioResult<Box<dyn AudioSource>> {
        self.open(url, channel)
    }
}

impl Sink for MockBackend {
    fn set_channel_gain(&mut self, channel: ChannelId, gain: f32) {
        self.shared.lock().unwrap().gains.insert(channel, gain);
    }

    fn microphone_feed(&mut self, levels: Arc<MicrophoneLevels>) -> MicFeed {
        let (feed, tap) = mic_channel(MIC_QUEUE_CAPACITY, levels);
        let mut log = self.shared.lock().unwrap();
        log.feeds_opened += 1;
        log.tap = Some(tap);
        feed
    }

    fn set_device(&mut self, index: usize) -> AudioResult<()> {
        let mut log = self.shared.lock().unwrap();
        if log.fail_set_device || index >= log.devices.len() {
            // The old stream is already closed when the new one fails
            log.device_lost = true;
            return Err(AudioError::DeviceNotFound(format!("device {}", index)));
        }
        log.device = index;
        log.device_lost = false;
        Ok(())
    }

    fn device_names(&self) -> Vec<String> {
        self.shared.lock().unwrap().devices.clone()
    }

    fn device_lost(&self) -> bool {
        self.shared.lock().unwrap().device_lost
    }

    fn free(&mut self) {
        self.shared.lock().unwrap().freed = true;
    }
}

/// Record of a mock microphone
#[derive(Default)]
pub struct MicLog {
    pub starts: usize,
    pub stops: usize,
    pub device: usize,
    pub feed: Option<MicFeed>,
    pub fail_start: bool,
    pub fail_set_device: bool,
}

pub type SharedMic = Arc<Mutex<MicLog>>;

pub struct MockMicrophone {
    shared: SharedMic,
}

impl MockMicrophone {
    pub fn new() -> (Self, SharedMic) {
        let shared = Arc::new(Mutex::new(MicLog::default()));
        (Self { shared: shared.clone() }, shared)
    }
}

impl MicrophoneInput for MockMicrophone {
    fn start(&mut self, feed: MicFeed) -> AudioResult<()> {
        let mut log = self.shared.lock().unwrap();
        if log.fail_start {
            return Err(AudioError::NoDefaultDevice("no input".to_string()));
        }
        log.starts += 1;
        log.feed = Some(feed);
        Ok(())
    }

    fn stop(&mut self) {
        let mut log = self.shared.lock().unwrap();
        if log.feed.take().is_some() {
            log.stops += 1;
        }
    }

    fn set_device(&mut self, index: usize) -> AudioResult<()> {
        let mut log = self.shared.lock().unwrap();
        if log.fail_set_device {
            return Err(AudioError::DeviceNotFound(format!("input device #{}", index)));
        }
        log.device = index;
        Ok(())
    }

    fn device_names(&self) -> Vec<String> {
        vec!["Built-in Microphone".to_string()]
    }
}

/// Write a 16-bit stereo PCM WAV file
pub fn write_test_wav(path: &Path, frames: &[(i16, i16)], sample_rate: u32) {
    use hound::{SampleFormat, WavSpec, WavWriter};

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &(left, right) in frames {
        writer.write_sample(left).unwrap();
        writer.write_sample(right).unwrap();
    }
    writer.finalize().unwrap();
}
