//! Microphone handoff between the capture thread and the output mix
//!
//! Capture and playback run on different audio threads. Mono frames move
//! from one to the other through a lock-free SPSC ring buffer:
//!
//! ```text
//!   capture callback ──push()──► [ rtrb ring ] ──next_frame()──► output callback
//!        (MicFeed)                                   (MicTap)
//! ```
//!
//! - The capture side never blocks: frames that do not fit are dropped.
//! - Capture usually runs at a different rate than the output, so the feed
//!   converts to the output rate with linear interpolation before queueing.
//! - The output side outputs silence whenever the ring is empty.
//! - Gain and pan live in [`MicrophoneLevels`], stored as f32 bit patterns in
//!   single-word atomics, so the command thread can change them while the
//!   output thread reads them without tearing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::normalize::ControlRange;
use crate::types::{pan_gains, StereoSample};

/// Ring capacity in mono samples (~340ms at 48kHz)
pub const MIC_QUEUE_CAPACITY: usize = 16384;

/// Microphone gain and pan shared with the output thread
///
/// All operations use `Ordering::Relaxed`; a briefly stale gain is fine,
/// a torn one is impossible.
#[derive(Debug)]
pub struct MicrophoneLevels {
    gain: AtomicU32,
    pan: AtomicU32,
}

impl MicrophoneLevels {
    /// Muted and centred, the state the microphone starts in
    pub fn new() -> Self {
        Self {
            gain: AtomicU32::new(0.0f32.to_bits()),
            pan: AtomicU32::new(0.0f32.to_bits()),
        }
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn pan(&self) -> f32 {
        f32::from_bits(self.pan.load(Ordering::Relaxed))
    }

    /// Store a gain, clamped to [0, 1]
    pub fn set_gain(&self, gain: f32) {
        let gain = ControlRange::Unit.clamp(gain);
        self.gain.store(gain.to_bits(), Ordering::Relaxed);
    }

    /// Store a pan, clamped to [-1, 1]
    pub fn set_pan(&self, pan: f32) {
        let pan = ControlRange::Bipolar.clamp(pan);
        self.pan.store(pan.to_bits(), Ordering::Relaxed);
    }
}

impl Default for MicrophoneLevels {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a connected feed/tap pair
pub fn mic_channel(capacity: usize, levels: Arc<MicrophoneLevels>) -> (MicFeed, MicTap) {
    let (producer, consumer) = RingBuffer::new(capacity);
    (
        MicFeed {
            producer,
            dropped: 0,
            input_rate: 0,
            output_rate: 0,
            step: 1.0,
            phase: 0.0,
            previous: 0.0,
        },
        MicTap { consumer, levels },
    )
}

/// Capture-side end of the microphone handoff
///
/// Until both rates are known, frames pass through unconverted.
pub struct MicFeed {
    producer: Producer<f32>,
    dropped: u64,
    input_rate: u32,
    output_rate: u32,
    /// Capture frames per output frame
    step: f64,
    /// Offset of the next output frame past `previous`, in capture frames
    phase: f64,
    previous: f32,
}

impl MicFeed {
    /// Rate of the output stream draining the tap
    pub fn set_output_rate(&mut self, rate: u32) {
        self.output_rate = rate;
        self.update_step();
    }

    /// Rate of the capture stream pushing into the feed
    pub fn set_input_rate(&mut self, rate: u32) {
        self.input_rate = rate;
        self.update_step();
    }

    fn update_step(&mut self) {
        self.step = if self.input_rate > 0 && self.output_rate > 0 {
            self.input_rate as f64 / self.output_rate as f64
        } else {
            1.0
        };
        self.phase = 0.0;
    }

    /// Push mono frames without blocking
    ///
    /// Returns how many output-rate frames were queued; the rest are dropped.
    pub fn push(&mut self, frames: &[f32]) -> usize {
        frames.iter().map(|&sample| self.push_sample(sample)).sum()
    }

    /// Push interleaved multi-channel frames, averaging them down to mono
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) -> usize {
        if channels <= 1 {
            return self.push(data);
        }
        data.chunks(channels)
            .map(|frame| self.push_sample(frame.iter().sum::<f32>() / frame.len() as f32))
            .sum()
    }

    fn push_sample(&mut self, sample: f32) -> usize {
        if self.step == 1.0 {
            return self.enqueue(sample);
        }
        let mut queued = 0;
        while self.phase < 1.0 {
            let value = self.previous + (sample - self.previous) * self.phase as f32;
            queued += self.enqueue(value);
            self.phase += self.step;
        }
        self.phase -= 1.0;
        self.previous = sample;
        queued
    }

    #[inline]
    fn enqueue(&mut self, sample: f32) -> usize {
        match self.producer.push(sample) {
            Ok(()) => 1,
            Err(_) => {
                self.dropped += 1;
                0
            }
        }
    }

    /// Frames dropped because the output side fell behind
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// The output side has gone away
    pub fn is_abandoned(&self) -> bool {
        self.producer.is_abandoned()
    }
}

impl Drop for MicFeed {
    fn drop(&mut self) {
        if self.dropped > 0 {
            log::warn!("Microphone: {} frames dropped", self.dropped);
        }
    }
}

/// Output-side end of the microphone handoff
pub struct MicTap {
    consumer: Consumer<f32>,
    levels: Arc<MicrophoneLevels>,
}

impl MicTap {
    /// Next microphone frame, with gain and pan applied
    ///
    /// Always consumes a frame when one is queued, even while muted, so the
    /// ring never backs up into the capture thread.
    #[inline]
    pub fn next_frame(&mut self) -> StereoSample {
        let sample = self.consumer.pop().unwrap_or(0.0);
        let gain = self.levels.gain();
        if gain == 0.0 {
            return StereoSample::silence();
        }
        let (left, right) = pan_gains(self.levels.pan());
        StereoSample::new(sample * gain * left, sample * gain * right)
    }

    /// The capture side has gone away
    pub fn is_abandoned(&self) -> bool {
        self.consumer.is_abandoned()
    }
}
