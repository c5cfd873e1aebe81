//! Deck - one playback slot on the console
//!
//! A deck owns at most one [`AudioSource`] and the parameters that outlive it:
//! volume, pan and frequency persist across track changes and are pushed to
//! every newly loaded source.
//!
//! # State machine
//!
//! ```text
//!            load (paused)            play / toggle
//!   Empty ───────────────► Paused ◄─────────────────► Playing
//!     │                                                  ▲
//!     └──────────────── load (armed) ────────────────────┘
//! ```
//!
//! The `paused` flag is independent of whether anything is loaded: pressing
//! play on an empty deck arms it, and the next load starts playing at once.

use std::path::Path;

use crate::error::{ConsoleError, ConsoleResult};
use crate::normalize::{clamp_position, ControlRange};
use crate::source::{AudioSource, SourceOpener};
use crate::types::{ChannelId, DeckSide, DEFAULT_FREQUENCY};

/// Observable state of a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckState {
    /// Nothing loaded
    Empty,
    /// Loaded, not advancing
    Paused,
    /// Loaded and playing
    Playing,
}

/// A single playback slot
pub struct Deck {
    side: DeckSide,
    source: Option<Box<dyn AudioSource>>,
    filename: Option<String>,
    is_url: bool,
    paused: bool,
    volume: f32,
    pan: f32,
    frequency: f32,
}

impl Deck {
    /// Create an empty, paused deck with default parameters
    pub fn new(side: DeckSide) -> Self {
        Self {
            side,
            source: None,
            filename: None,
            is_url: false,
            paused: true,
            volume: 1.0,
            pan: 0.0,
            frequency: DEFAULT_FREQUENCY,
        }
    }

    pub fn side(&self) -> DeckSide {
        self.side
    }

    /// Display name, e.g. "Left Deck"
    pub fn name(&self) -> String {
        format!("{} Deck", self.side.name())
    }

    /// Last successfully loaded path or URL
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn is_url(&self) -> bool {
        self.is_url
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn state(&self) -> DeckState {
        match (&self.source, self.paused) {
            (None, _) => DeckState::Empty,
            (Some(_), true) => DeckState::Paused,
            (Some(_), false) => DeckState::Playing,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────

    /// Load a local file or URL onto this deck
    ///
    /// On failure nothing changes and the current source keeps playing. On
    /// success the old source is released, the deck's parameters are applied
    /// to the new one, and playback starts if the deck was not paused.
    pub fn load(
        &mut self,
        opener: &mut dyn SourceOpener,
        source_ref: &str,
        is_url: bool,
    ) -> ConsoleResult<()> {
        let channel = ChannelId::Deck(self.side);
        let opened = if is_url {
            opener.open_url(source_ref, channel)
        } else {
            opener.open_file(Path::new(source_ref), channel)
        };

        let mut source = match opened {
            Ok(source) => source,
            Err(e) => {
                log::warn!("{}: failed to load {}: {}", self.name(), source_ref, e);
                return Err(ConsoleError::source_unavailable(source_ref, &e));
            }
        };

        if let Some(mut old) = self.source.take() {
            old.release();
        }

        source.set_volume(self.volume);
        source.set_pan(self.pan);
        source.set_frequency(self.frequency);
        if !self.paused {
            source.play();
        }

        log::info!(
            "{}: loaded {} ({} ticks, {})",
            self.name(),
            source_ref,
            source.length(),
            if self.paused { "paused" } else { "playing" }
        );

        self.source = Some(source);
        self.filename = Some(source_ref.to_string());
        self.is_url = is_url;
        Ok(())
    }

    /// Release the loaded source, leaving the deck empty
    pub fn unload(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
            log::debug!("{}: released source", self.name());
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────

    /// Start playback; on an empty deck this only arms it
    pub fn play(&mut self) {
        self.paused = false;
        if let Some(source) = self.source.as_mut() {
            source.play();
        }
        log::info!("{}: play", self.name());
    }

    pub fn pause(&mut self) {
        self.paused = true;
        if let Some(source) = self.source.as_mut() {
            source.pause();
        }
        log::info!("{}: pause", self.name());
    }

    /// Flip between playing and paused, returning the new `paused` flag
    pub fn toggle_play_pause(&mut self) -> bool {
        if self.paused {
            self.play();
        } else {
            self.pause();
        }
        self.paused
    }

    /// Pause and rewind to the start
    pub fn stop(&mut self) {
        self.pause();
        self.seek(0, true);
    }

    /// Pause because the output device went away
    ///
    /// The source may already be gone with the device, so only the flag and
    /// a best-effort pause are applied.
    pub fn suspend(&mut self) {
        if !self.paused && self.source.is_some() {
            log::warn!("{}: output lost, pausing", self.name());
        }
        self.pause();
    }

    // ─────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = ControlRange::Unit.clamp(volume);
        if let Some(source) = self.source.as_mut() {
            source.set_volume(self.volume);
        }
        log::info!("{}: volume {:.2}", self.name(), self.volume);
    }

    pub fn set_pan(&mut self, pan: f32) {
        self.pan = ControlRange::Bipolar.clamp(pan);
        if let Some(source) = self.source.as_mut() {
            source.set_pan(self.pan);
        }
        log::info!("{}: pan {:.2}", self.name(), self.pan);
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = ControlRange::Frequency.clamp(frequency);
        if let Some(source) = self.source.as_mut() {
            source.set_frequency(self.frequency);
        }
        log::info!("{}: frequency {:.0}", self.name(), self.frequency);
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    pub fn adjust_pan(&mut self, delta: f32) {
        self.set_pan(self.pan + delta);
    }

    pub fn adjust_frequency(&mut self, delta: f32) {
        self.set_frequency(self.frequency + delta);
    }

    /// Restore volume 1.0, pan 0.0 and frequency 44100
    ///
    /// Leaves the loaded track and play state alone.
    pub fn reset(&mut self) {
        self.set_volume(1.0);
        self.set_pan(0.0);
        self.set_frequency(DEFAULT_FREQUENCY);
    }

    // ─────────────────────────────────────────────────────────────
    // Position
    // ─────────────────────────────────────────────────────────────

    /// Playback offset in ticks, 0 when empty
    pub fn position(&self) -> u64 {
        self.source.as_ref().map_or(0, |s| s.position())
    }

    /// Track length in ticks, 0 when empty
    pub fn length(&self) -> u64 {
        self.source.as_ref().map_or(0, |s| s.length())
    }

    /// Move to `amount` (absolute) or by `amount` (relative)
    ///
    /// The target is clamped to `[0, length - 1]`. Inert when empty.
    pub fn seek(&mut self, amount: i64, absolute: bool) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let target = if absolute {
            amount
        } else {
            (source.position() as i64).saturating_add(amount)
        };
        let position = clamp_position(target, source.length());
        source.set_position(position);
        log::debug!("{}: seek to {}", self.name(), position);
    }

    /// How far through the track playback is, 0 to 100
    pub fn progress_percent(&self) -> Option<f32> {
        let source = self.source.as_ref()?;
        let length = source.length();
        if length == 0 {
            return Some(0.0);
        }
        Some(source.position() as f32 / length as f32 * 100.0)
    }
}

impl Drop for Deck {
    fn drop(&mut self) {
        self.unload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    fn loaded(length: u64) -> (Deck, MockBackend, crate::testing::SharedBackend) {
        let (mut backend, log) = MockBackend::new(length);
        let mut deck = Deck::new(DeckSide::Left);
        deck.load(&mut backend, "one.wav", false).unwrap();
        (deck, backend, log)
    }

    #[test]
    fn test_new_deck_defaults() {
        let deck = Deck::new(DeckSide::Right);
        assert_eq!(deck.state(), DeckState::Empty);
        assert!(deck.is_paused());
        assert_eq!(deck.volume(), 1.0);
        assert_eq!(deck.pan(), 0.0);
        assert_eq!(deck.frequency(), 44100.0);
        assert_eq!(deck.name(), "Right Deck");
        assert_eq!(deck.position(), 0);
    }

    #[test]
    fn test_volume_clamps_out_of_range() {
        let mut deck = Deck::new(DeckSide::Left);
        for v in [-5.0, -0.01, 1.01, 3.0, f32::INFINITY] {
            deck.set_volume(v);
            assert_eq!(deck.volume(), v.clamp(0.0, 1.0));
        }
    }

    #[test]
    fn test_pan_clamps_out_of_range() {
        let mut deck = Deck::new(DeckSide::Left);
        for v in [-9.0, -1.5, 1.2, 40.0] {
            deck.set_pan(v);
            assert_eq!(deck.pan(), v.clamp(-1.0, 1.0));
        }
    }

    #[test]
    fn test_frequency_clamps_to_range() {
        let mut deck = Deck::new(DeckSide::Left);
        deck.set_frequency(1.0);
        assert_eq!(deck.frequency(), 10.0);
        deck.set_frequency(500000.0);
        assert_eq!(deck.frequency(), 100000.0);
        deck.adjust_frequency(-200.0);
        assert_eq!(deck.frequency(), 99800.0);
    }

    #[test]
    fn test_parameters_stored_while_empty_apply_on_load() {
        let (mut backend, log) = MockBackend::new(1000);
        let mut deck = Deck::new(DeckSide::Right);
        deck.set_volume(0.4);
        deck.set_pan(-0.5);
        deck.set_frequency(22050.0);

        deck.load(&mut backend, "two.mp3", false).unwrap();
        let log = log.lock().unwrap();
        let source = log.source(0);
        assert_eq!(source.volume, 0.4);
        assert_eq!(source.pan, -0.5);
        assert_eq!(source.frequency, 22050.0);
        assert_eq!(source.channel, Some(ChannelId::Deck(DeckSide::Right)));
        assert!(!source.playing);
    }

    #[test]
    fn test_setters_push_to_loaded_source() {
        let (mut deck, _backend, log) = loaded(1000);
        deck.set_volume(0.25);
        deck.adjust_pan(0.1);
        assert_eq!(log.lock().unwrap().source(0).volume, 0.25);
        assert!((log.lock().unwrap().source(0).pan - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_load_while_playing_auto_resumes() {
        let (mut deck, mut backend, log) = loaded(1000);
        deck.play();
        assert_eq!(deck.state(), DeckState::Playing);

        deck.load(&mut backend, "next.wav", false).unwrap();
        assert_eq!(deck.state(), DeckState::Playing);
        let log = log.lock().unwrap();
        assert!(log.source(0).released);
        assert!(log.source(1).playing);
    }

    #[test]
    fn test_load_while_paused_stays_paused() {
        let (mut deck, mut backend, log) = loaded(1000);
        deck.load(&mut backend, "next.wav", false).unwrap();
        assert_eq!(deck.state(), DeckState::Paused);
        assert!(!log.lock().unwrap().source(1).playing);
    }

    #[test]
    fn test_armed_empty_deck_plays_on_load() {
        let (mut backend, log) = MockBackend::new(1000);
        let mut deck = Deck::new(DeckSide::Left);
        deck.play();
        assert_eq!(deck.state(), DeckState::Empty);
        assert!(!deck.is_paused());

        deck.load(&mut backend, "armed.wav", false).unwrap();
        assert_eq!(deck.state(), DeckState::Playing);
        assert!(log.lock().unwrap().source(0).playing);
    }

    #[test]
    fn test_failed_load_leaves_deck_untouched() {
        let (mut deck, mut backend, log) = loaded(1000);
        deck.play();
        log.lock().unwrap().fail_open = true;

        let err = deck.load(&mut backend, "missing.wav", false).unwrap_err();
        assert!(matches!(err, ConsoleError::SourceUnavailable { ref source_ref, .. } if source_ref == "missing.wav"));
        assert_eq!(deck.filename(), Some("one.wav"));
        assert_eq!(deck.state(), DeckState::Playing);
        let log = log.lock().unwrap();
        assert!(!log.source(0).released);
        assert!(log.source(0).playing);
    }

    #[test]
    fn test_load_url_sets_flag() {
        let (mut backend, _log) = MockBackend::new(1000);
        let mut deck = Deck::new(DeckSide::Left);
        deck.load(&mut backend, "http://radio.example/stream", true).unwrap();
        assert!(deck.is_url());
        assert_eq!(deck.filename(), Some("http://radio.example/stream"));
    }

    #[test]
    fn test_seek_absolute_past_end_clamps_to_last_tick() {
        let (mut deck, _backend, _log) = loaded(1000);
        deck.seek(1000 + 1000, true);
        assert_eq!(deck.position(), 999);
    }

    #[test]
    fn test_seek_relative_before_start_clamps_to_zero() {
        let (mut deck, _backend, _log) = loaded(1000);
        deck.seek(-500, false);
        assert_eq!(deck.position(), 0);
    }

    #[test]
    fn test_seek_relative_moves_from_current() {
        let (mut deck, _backend, _log) = loaded(1000);
        deck.seek(300, true);
        deck.seek(150, false);
        assert_eq!(deck.position(), 450);
        deck.seek(-100, false);
        assert_eq!(deck.position(), 350);
    }

    #[test]
    fn test_seek_on_empty_deck_is_inert() {
        let mut deck = Deck::new(DeckSide::Left);
        deck.seek(100, true);
        assert_eq!(deck.position(), 0);
    }

    #[test]
    fn test_reset_restores_parameters_only() {
        let (mut deck, _backend, _log) = loaded(1000);
        deck.play();
        deck.set_volume(0.1);
        deck.set_pan(0.9);
        deck.set_frequency(80000.0);

        deck.reset();
        assert_eq!(deck.volume(), 1.0);
        assert_eq!(deck.pan(), 0.0);
        assert_eq!(deck.frequency(), 44100.0);
        assert!(!deck.is_paused());
        assert_eq!(deck.filename(), Some("one.wav"));
        assert_eq!(deck.state(), DeckState::Playing);
    }

    #[test]
    fn test_toggle_and_stop() {
        let (mut deck, _backend, log) = loaded(1000);
        assert!(!deck.toggle_play_pause());
        assert!(log.lock().unwrap().source(0).playing);
        deck.seek(600, true);

        deck.stop();
        assert_eq!(deck.state(), DeckState::Paused);
        assert_eq!(deck.position(), 0);
    }

    #[test]
    fn test_progress_percent() {
        let (mut deck, _backend, _log) = loaded(1000);
        deck.seek(250, true);
        assert_eq!(deck.progress_percent(), Some(25.0));
        assert_eq!(Deck::new(DeckSide::Left).progress_percent(), None);
    }

    #[test]
    fn test_drop_releases_source() {
        let (deck, _backend, log) = loaded(1000);
        drop(deck);
        assert!(log.lock().unwrap().source(0).released);
    }
}
