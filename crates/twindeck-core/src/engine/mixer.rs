//! Mixer - crossfader, master volume and microphone levels
//!
//! # Crossfade gain law
//!
//! The crossfader is an integer in [-100, 100]. The side it is pushed
//! toward stays at unity while the other side ramps linearly to zero:
//!
//! ```text
//!   crossfader   -100   -50     0    +50   +100
//!   left gain     1.0   1.0   1.0    0.5    0.0
//!   right gain    0.0   0.5   1.0    1.0    1.0
//! ```
//!
//! This is a one-sided linear taper, not an equal-power law: at centre both
//! decks play at full level. The crossfade gain never touches a deck's own
//! volume; it is applied on the sink, so the audible level of a deck is
//! `deck.volume * crossfade_gain(side)`, then scaled by the master volume.

use std::sync::Arc;

use crate::normalize::{clamp_crossfader, ControlRange};
use crate::types::{DeckSide, CROSSFADER_RANGE, MAX_MASTER_VOLUME};

use super::microphone::MicrophoneLevels;

/// Crossfade gain for one side at a given crossfader position
pub fn crossfade_gain(side: DeckSide, crossfader: i32) -> f32 {
    let crossfader = clamp_crossfader(crossfader);
    let range = CROSSFADER_RANGE as f32;
    match side {
        DeckSide::Left if crossfader > 0 => (range - crossfader as f32) / range,
        DeckSide::Right if crossfader < 0 => (range + crossfader as f32) / range,
        _ => 1.0,
    }
}

/// Console-wide levels
#[derive(Debug)]
pub struct Mixer {
    master_volume: f32,
    crossfader: i32,
    microphone: Arc<MicrophoneLevels>,
}

impl Mixer {
    /// Full master, centred crossfader, muted microphone
    pub fn new() -> Self {
        Self {
            master_volume: MAX_MASTER_VOLUME,
            crossfader: 0,
            microphone: Arc::new(MicrophoneLevels::new()),
        }
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Master volume as a 0.0 to 1.0 sink gain
    pub fn master_gain(&self) -> f32 {
        self.master_volume / MAX_MASTER_VOLUME
    }

    pub fn crossfader(&self) -> i32 {
        self.crossfader
    }

    /// Crossfade gain for a side at the current position
    pub fn deck_gain(&self, side: DeckSide) -> f32 {
        crossfade_gain(side, self.crossfader)
    }

    /// Audible level of a deck with the given volume, before master
    pub fn output_gain(&self, side: DeckSide, deck_volume: f32) -> f32 {
        deck_volume * self.deck_gain(side)
    }

    /// Levels shared with the output thread
    pub fn microphone(&self) -> &Arc<MicrophoneLevels> {
        &self.microphone
    }

    pub fn microphone_gain(&self) -> f32 {
        self.microphone.gain()
    }

    pub fn microphone_pan(&self) -> f32 {
        self.microphone.pan()
    }

    // ─────────────────────────────────────────────────────────────
    // Crossfader
    // ─────────────────────────────────────────────────────────────

    /// Move the crossfader `amount` steps toward `toward`
    pub fn nudge(&mut self, toward: DeckSide, amount: i32) {
        self.set_crossfader(self.crossfader.saturating_add(toward.sign().saturating_mul(amount)));
    }

    /// Snap fully to one side, cutting the other deck
    pub fn cut(&mut self, side: DeckSide) {
        self.set_crossfader(side.sign() * CROSSFADER_RANGE);
    }

    pub fn center(&mut self) {
        self.set_crossfader(0);
    }

    pub fn set_crossfader(&mut self, value: i32) {
        self.crossfader = clamp_crossfader(value);
        log::info!(
            "Mixer: crossfader {} (left {:.2}, right {:.2})",
            self.crossfader,
            self.deck_gain(DeckSide::Left),
            self.deck_gain(DeckSide::Right)
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Master volume
    // ─────────────────────────────────────────────────────────────

    /// Move master volume by `delta` (positive is louder)
    pub fn adjust_master(&mut self, delta: f32) {
        self.set_master_volume(self.master_volume + delta);
    }

    pub fn full(&mut self) {
        self.set_master_volume(MAX_MASTER_VOLUME);
    }

    pub fn mute(&mut self) {
        self.set_master_volume(0.0);
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = ControlRange::Master.clamp(volume);
        log::info!("Mixer: master volume {:.1}", self.master_volume);
    }

    // ─────────────────────────────────────────────────────────────
    // Microphone
    // ─────────────────────────────────────────────────────────────

    /// Flip the microphone between muted and full, returning whether it is now live
    pub fn toggle_mic(&mut self) -> bool {
        let live = self.microphone.gain() == 0.0;
        self.microphone.set_gain(if live { 1.0 } else { 0.0 });
        log::info!("Mixer: microphone {}", if live { "on" } else { "off" });
        live
    }

    pub fn set_mic_pan(&mut self, pan: f32) {
        self.microphone.set_pan(pan);
        log::info!("Mixer: microphone pan {:.2}", self.microphone.pan());
    }

    pub fn adjust_mic_pan(&mut self, delta: f32) {
        self.set_mic_pan(self.microphone.pan() + delta);
    }

    /// Centre the microphone pan
    pub fn reset_mic(&mut self) {
        self.set_mic_pan(0.0);
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_law_endpoints() {
        assert_eq!(crossfade_gain(DeckSide::Left, -100), 1.0);
        assert_eq!(crossfade_gain(DeckSide::Right, -100), 0.0);
        assert_eq!(crossfade_gain(DeckSide::Left, 100), 0.0);
        assert_eq!(crossfade_gain(DeckSide::Right, 100), 1.0);
        assert_eq!(crossfade_gain(DeckSide::Left, 0), 1.0);
        assert_eq!(crossfade_gain(DeckSide::Right, 0), 1.0);
    }

    #[test]
    fn test_gain_law_is_not_equal_power() {
        // Centre sums to 2.0, the ends to 1.0
        let sum = |c: i32| crossfade_gain(DeckSide::Left, c) + crossfade_gain(DeckSide::Right, c);
        assert_eq!(sum(0), 2.0);
        assert_eq!(sum(100), 1.0);
        assert!((sum(-50) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_gain_law_clamps_out_of_range_input() {
        assert_eq!(crossfade_gain(DeckSide::Right, -250), 0.0);
        assert_eq!(crossfade_gain(DeckSide::Left, 250), 0.0);
    }

    #[test]
    fn test_nudge_then_cut_scenario() {
        let mut mixer = Mixer::new();
        assert_eq!(mixer.deck_gain(DeckSide::Left), 1.0);
        assert_eq!(mixer.deck_gain(DeckSide::Right), 1.0);

        mixer.nudge(DeckSide::Right, 40);
        assert_eq!(mixer.crossfader(), 40);
        assert!((mixer.deck_gain(DeckSide::Left) - 0.6).abs() < 1e-6);
        assert_eq!(mixer.deck_gain(DeckSide::Right), 1.0);

        mixer.cut(DeckSide::Left);
        assert_eq!(mixer.crossfader(), -100);
        assert_eq!(mixer.deck_gain(DeckSide::Left), 1.0);
        assert_eq!(mixer.deck_gain(DeckSide::Right), 0.0);
    }

    #[test]
    fn test_nudge_clamps_and_center() {
        let mut mixer = Mixer::new();
        mixer.nudge(DeckSide::Left, 70);
        mixer.nudge(DeckSide::Left, 70);
        assert_eq!(mixer.crossfader(), -100);
        mixer.nudge(DeckSide::Right, i32::MAX);
        assert_eq!(mixer.crossfader(), 100);
        mixer.center();
        assert_eq!(mixer.crossfader(), 0);
    }

    #[test]
    fn test_output_gain_scales_deck_volume() {
        let mut mixer = Mixer::new();
        mixer.nudge(DeckSide::Left, 25);
        assert!((mixer.output_gain(DeckSide::Right, 0.8) - 0.6).abs() < 1e-6);
        assert_eq!(mixer.output_gain(DeckSide::Left, 0.8), 0.8);
    }

    #[test]
    fn test_master_volume_bounds() {
        let mut mixer = Mixer::new();
        assert_eq!(mixer.master_volume(), 100.0);
        mixer.adjust_master(5.0);
        assert_eq!(mixer.master_volume(), 100.0);
        mixer.adjust_master(-30.0);
        assert_eq!(mixer.master_volume(), 70.0);
        assert!((mixer.master_gain() - 0.7).abs() < 1e-6);
        mixer.mute();
        assert_eq!(mixer.master_volume(), 0.0);
        mixer.adjust_master(-5.0);
        assert_eq!(mixer.master_volume(), 0.0);
        mixer.full();
        assert_eq!(mixer.master_volume(), 100.0);
    }

    #[test]
    fn test_mic_toggle_and_pan() {
        let mut mixer = Mixer::new();
        assert_eq!(mixer.microphone_gain(), 0.0);
        assert!(mixer.toggle_mic());
        assert_eq!(mixer.microphone_gain(), 1.0);
        assert!(!mixer.toggle_mic());
        assert_eq!(mixer.microphone_gain(), 0.0);

        for v in [-4.0, -1.1, 1.5, 9.0] {
            mixer.set_mic_pan(v);
            assert_eq!(mixer.microphone_pan(), v.clamp(-1.0, 1.0));
        }
        mixer.reset_mic();
        assert_eq!(mixer.microphone_pan(), 0.0);
    }
}
