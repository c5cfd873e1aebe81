//! Console commands
//!
//! Every control gesture resolves to one of these values before it touches
//! any state. Commands are plain data: they carry the target deck and the
//! step sizes, so the console needs no configuration of its own.

use crate::types::DeckSide;

/// Actions that target a single deck
#[derive(Debug, Clone, PartialEq)]
pub enum DeckAction {
    // ─────────────────────────────────────────────────────────────
    // Track Management
    // ─────────────────────────────────────────────────────────────
    /// Load a local path (`is_url == false`) or a stream URL
    Load { source_ref: String, is_url: bool },

    // ─────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────
    Play,
    Pause,
    TogglePlay,
    /// Pause and rewind to the start
    Stop,
    /// Move to `amount` ticks (absolute) or by `amount` ticks (relative)
    Seek { amount: i64, absolute: bool },

    // ─────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────
    /// Volume, pan and frequency back to defaults
    Reset,
    SetVolume(f32),
    AdjustVolume(f32),
    SetPan(f32),
    AdjustPan(f32),
    SetFrequency(f32),
    AdjustFrequency(f32),

    // ─────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────
    /// Announce how far through the track playback is
    ReportProgress,
    /// Announce whether the deck is paused
    ReportPlayState,
}

/// Actions on the mixer
#[derive(Debug, Clone, PartialEq)]
pub enum MixerAction {
    /// Move the crossfader toward a side
    NudgeCrossfader { toward: DeckSide, amount: i32 },
    /// Snap the crossfader fully to a side
    CutCrossfader(DeckSide),
    CenterCrossfader,
    /// Change master volume by a signed step
    AdjustMaster(f32),
    FullMaster,
    MuteMaster,
    ToggleMicrophone,
    AdjustMicrophonePan(f32),
    SetMicrophonePan(f32),
    /// Centre the microphone pan
    ResetMicrophone,
}

/// A fully resolved console command
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Deck-specific action
    Deck { deck: DeckSide, action: DeckAction },
    /// The same action on both decks, left first
    AllDecks(DeckAction),
    Mixer(MixerAction),
    /// Switch output to the device at this index
    SelectOutput(usize),
    /// Switch microphone capture to the input device at this index
    SelectInput(usize),
}

impl ConsoleCommand {
    /// Shorthand for a deck command
    pub fn deck(deck: DeckSide, action: DeckAction) -> Self {
        Self::Deck { deck, action }
    }
}
