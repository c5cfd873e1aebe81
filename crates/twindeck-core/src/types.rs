//! Common types for twindeck
//!
//! This module contains the fundamental types shared by the console engine,
//! the audio backend and the key router: deck sides, output channels and
//! stereo samples.

use serde::{Deserialize, Serialize};

/// Number of decks on the console
pub const NUM_DECKS: usize = 2;

/// Playback rate that plays every source at its natural speed
pub const DEFAULT_FREQUENCY: f32 = 44100.0;

/// Lowest accepted playback rate
pub const MIN_FREQUENCY: f32 = 10.0;

/// Highest accepted playback rate
pub const MAX_FREQUENCY: f32 = 100000.0;

/// Crossfader travel in each direction from centre
pub const CROSSFADER_RANGE: i32 = 100;

/// Master volume ceiling (percent)
pub const MAX_MASTER_VOLUME: f32 = 100.0;

/// Audio sample type
pub type Sample = f32;

/// Which of the two decks an action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckSide {
    Left,
    Right,
}

impl DeckSide {
    /// Both sides, left first
    pub const ALL: [DeckSide; NUM_DECKS] = [DeckSide::Left, DeckSide::Right];

    /// Get the name of this side
    pub fn name(&self) -> &'static str {
        match self {
            DeckSide::Left => "Left",
            DeckSide::Right => "Right",
        }
    }

    /// Index into per-deck arrays (left = 0)
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            DeckSide::Left => 0,
            DeckSide::Right => 1,
        }
    }

    /// Crossfader sign of this side (-1 for left, +1 for right)
    #[inline]
    pub fn sign(&self) -> i32 {
        match self {
            DeckSide::Left => -1,
            DeckSide::Right => 1,
        }
    }
}

impl std::fmt::Display for DeckSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A gain stage on the output sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// Everything a deck's source produces
    Deck(DeckSide),
    /// Final output trim
    Master,
}

/// A single stereo sample (left and right channels)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    /// Create a new stereo sample
    #[inline]
    pub fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    /// Create a silent stereo sample
    #[inline]
    pub fn silence() -> Self {
        Self::default()
    }

    /// Same value on both channels
    #[inline]
    pub fn mono(value: Sample) -> Self {
        Self::new(value, value)
    }

    /// Scale both channels by a gain factor
    #[inline]
    pub fn scale(self, gain: f32) -> Self {
        Self::new(self.left * gain, self.right * gain)
    }

    /// Linear interpolation between two samples
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.left + (other.left - self.left) * t,
            self.right + (other.right - self.right) * t,
        )
    }
}

impl std::ops::Add for StereoSample {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.left + rhs.left, self.right + rhs.right)
    }
}

impl std::ops::AddAssign for StereoSample {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

/// Balance-law channel gains for a pan position
///
/// Negative pan attenuates the right channel, positive pan the left one.
/// Centre leaves both at unity.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    if pan < 0.0 {
        (1.0, 1.0 + pan)
    } else {
        (1.0 - pan, 1.0)
    }
}
