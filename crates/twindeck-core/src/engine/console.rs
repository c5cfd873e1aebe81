//! Console - two decks, the mixer and the audio devices behind them
//!
//! The console is the single owner of all mutable console state. Commands
//! arrive one at a time from the key loop and run to completion; the only
//! state shared with audio threads is the microphone levels and whatever the
//! backend keeps behind its sources.
//!
//! After every mixer change the console pushes the derived gains to the sink:
//! - `Deck(Left)` / `Deck(Right)`: crossfade gain (deck volume is on the source)
//! - `Master`: master volume / 100

use crate::error::{ConsoleError, ConsoleResult};
use crate::sink::{AudioBackend, MicrophoneInput};
use crate::types::{ChannelId, DeckSide, NUM_DECKS};

use super::command::{ConsoleCommand, DeckAction, MixerAction};
use super::deck::Deck;
use super::mixer::Mixer;

/// The whole console
pub struct Console {
    decks: [Deck; NUM_DECKS],
    mixer: Mixer,
    output: Box<dyn AudioBackend>,
    input: Option<Box<dyn MicrophoneInput>>,
    microphone_running: bool,
    device_lost_reported: bool,
    shut_down: bool,
}

impl Console {
    /// Create the console and start microphone capture if an input is given
    ///
    /// A microphone that fails to start is logged and left off; the decks
    /// work without it.
    pub fn new(output: Box<dyn AudioBackend>, input: Option<Box<dyn MicrophoneInput>>) -> Self {
        let mut console = Self {
            decks: [Deck::new(DeckSide::Left), Deck::new(DeckSide::Right)],
            mixer: Mixer::new(),
            output,
            input,
            microphone_running: false,
            device_lost_reported: false,
            shut_down: false,
        };
        console.sync_gains();
        if let Err(e) = console.start_microphone() {
            log::warn!("Console: microphone unavailable: {}", e);
        }
        console
    }

    pub fn deck(&self, side: DeckSide) -> &Deck {
        &self.decks[side.index()]
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn microphone_running(&self) -> bool {
        self.microphone_running
    }

    /// Run one command, returning a short announcement of the result
    pub fn apply(&mut self, command: ConsoleCommand) -> ConsoleResult<String> {
        log::debug!("Console: {:?}", command);
        match command {
            ConsoleCommand::Deck { deck, action } => self.apply_deck(deck, action),
            ConsoleCommand::AllDecks(action) => {
                let mut announcements = Vec::with_capacity(NUM_DECKS);
                for side in DeckSide::ALL {
                    announcements.push(self.apply_deck(side, action.clone())?);
                }
                Ok(announcements.join(" "))
            }
            ConsoleCommand::Mixer(action) => Ok(self.apply_mixer(action)),
            ConsoleCommand::SelectOutput(index) => self.select_output(index),
            ConsoleCommand::SelectInput(index) => self.select_input(index),
        }
    }

    fn apply_deck(&mut self, side: DeckSide, action: DeckAction) -> ConsoleResult<String> {
        let deck = &mut self.decks[side.index()];
        let announcement = match action {
            DeckAction::Load { source_ref, is_url } => {
                deck.load(self.output.opener(), &source_ref, is_url)?;
                format!("Loaded {} on {} deck.", source_ref, side)
            }
            DeckAction::Play => {
                deck.play();
                format!("Play {} deck.", side)
            }
            DeckAction::Pause => {
                deck.pause();
                format!("Pause {} deck.", side)
            }
            DeckAction::TogglePlay => {
                let paused = deck.toggle_play_pause();
                format!("{} {} deck.", if paused { "Pause" } else { "Play" }, side)
            }
            DeckAction::Stop => {
                deck.stop();
                format!("Stopped {} deck.", side)
            }
            DeckAction::Seek { amount, absolute } => {
                deck.seek(amount, absolute);
                match deck.progress_percent() {
                    Some(percent) => format!("{:.2}%", percent),
                    None => "Nothing playing.".to_string(),
                }
            }
            DeckAction::Reset => {
                deck.reset();
                format!("Reset {}.", side)
            }
            DeckAction::SetVolume(volume) => {
                deck.set_volume(volume);
                match deck.volume() {
                    v if v >= 1.0 => "Volume full.".to_string(),
                    v if v <= 0.0 => "Volume mute.".to_string(),
                    v => format!("Volume {:.1}.", v),
                }
            }
            DeckAction::AdjustVolume(delta) => {
                deck.adjust_volume(delta);
                format!("Volume {:.1}.", deck.volume())
            }
            DeckAction::SetPan(pan) => {
                deck.set_pan(pan);
                if pan == 0.0 {
                    "Reset pan.".to_string()
                } else {
                    format!("Pan {:.1}.", deck.pan())
                }
            }
            DeckAction::AdjustPan(delta) => {
                deck.adjust_pan(delta);
                format!("Pan {:.1}.", deck.pan())
            }
            DeckAction::SetFrequency(frequency) => {
                deck.set_frequency(frequency);
                if frequency == crate::types::DEFAULT_FREQUENCY {
                    "Reset frequency.".to_string()
                } else {
                    format!("Frequency {:.0}.", deck.frequency())
                }
            }
            DeckAction::AdjustFrequency(delta) => {
                deck.adjust_frequency(delta);
                format!("Frequency {:.0}.", deck.frequency())
            }
            DeckAction::ReportProgress => match deck.progress_percent() {
                Some(percent) => format!("{:.2}%", percent),
                None => "Nothing playing.".to_string(),
            },
            DeckAction::ReportPlayState => {
                let state = if deck.is_paused() { "Paused." } else { "Not paused." };
                state.to_string()
            }
        };
        Ok(announcement)
    }

    fn apply_mixer(&mut self, action: MixerAction) -> String {
        let announcement = match action {
            MixerAction::NudgeCrossfader { toward, amount } => {
                self.mixer.nudge(toward, amount);
                format!("Crossfader {}.", self.mixer.crossfader())
            }
            MixerAction::CutCrossfader(side) => {
                self.mixer.cut(side);
                format!("Cut to {} deck.", side)
            }
            MixerAction::CenterCrossfader => {
                self.mixer.center();
                "Crossfader centre.".to_string()
            }
            MixerAction::AdjustMaster(delta) => {
                self.mixer.adjust_master(delta);
                format!("Master volume {:.2}.", self.mixer.master_volume())
            }
            MixerAction::FullMaster => {
                self.mixer.full();
                format!("Master volume {:.2}.", self.mixer.master_volume())
            }
            MixerAction::MuteMaster => {
                self.mixer.mute();
                format!("Master volume {:.2}.", self.mixer.master_volume())
            }
            MixerAction::ToggleMicrophone => {
                let said = if self.mixer.toggle_mic() { "Mic on." } else { "Mic off." };
                said.to_string()
            }
            MixerAction::AdjustMicrophonePan(delta) => {
                self.mixer.adjust_mic_pan(delta);
                format!("Microphone pan {:.1}.", self.mixer.microphone_pan())
            }
            MixerAction::SetMicrophonePan(pan) => {
                self.mixer.set_mic_pan(pan);
                format!("Microphone pan {:.1}.", self.mixer.microphone_pan())
            }
            MixerAction::ResetMicrophone => {
                self.mixer.reset_mic();
                "Reset mic.".to_string()
            }
        };
        self.sync_gains();
        announcement
    }

    /// Push crossfade and master gains to the sink
    fn sync_gains(&mut self) {
        for side in DeckSide::ALL {
            self.output
                .set_channel_gain(ChannelId::Deck(side), self.mixer.deck_gain(side));
        }
        self.output
            .set_channel_gain(ChannelId::Master, self.mixer.master_gain());
    }

    // ─────────────────────────────────────────────────────────────
    // Devices
    // ─────────────────────────────────────────────────────────────

    pub fn output_devices(&self) -> Vec<String> {
        self.output.device_names()
    }

    pub fn input_devices(&self) -> Vec<String> {
        self.input
            .as_ref()
            .map(|input| input.device_names())
            .unwrap_or_default()
    }

    /// Move playback to another output device
    ///
    /// Loaded sources stay attached. If the switch fails every deck is
    /// paused, since nothing can be heard until a device is chosen.
    pub fn select_output(&mut self, index: usize) -> ConsoleResult<String> {
        self.stop_microphone();
        if let Err(e) = self.output.set_device(index) {
            log::error!("Console: could not switch output to device {}: {}", index, e);
            // The switch error is the loss report
            self.device_lost_reported = true;
            self.suspend_decks();
            return Err(e.into());
        }
        self.device_lost_reported = false;
        self.sync_gains();
        if let Err(e) = self.start_microphone() {
            log::warn!("Console: microphone did not restart: {}", e);
        }

        let name = self.output_devices().get(index).cloned().unwrap_or_default();
        log::info!("Console: output set to {}", name);
        Ok(format!("Output {}.", name))
    }

    /// Move microphone capture to another input device
    ///
    /// If the new device cannot be selected, capture resumes on the previous
    /// one before the error is returned.
    pub fn select_input(&mut self, index: usize) -> ConsoleResult<String> {
        if self.input.is_none() {
            return Err(ConsoleError::DeviceUnavailable(
                "no microphone input".to_string(),
            ));
        }
        let was_running = self.microphone_running;
        self.stop_microphone();
        let switched = match self.input.as_mut() {
            Some(input) => input.set_device(index),
            None => Ok(()),
        };
        if let Err(e) = switched {
            log::error!("Console: could not switch input to device {}: {}", index, e);
            if was_running {
                if let Err(e) = self.start_microphone() {
                    log::warn!("Console: microphone did not restart: {}", e);
                }
            }
            return Err(e.into());
        }
        self.start_microphone()?;

        let name = self.input_devices().get(index).cloned().unwrap_or_default();
        log::info!("Console: input set to {}", name);
        Ok(format!("Input {}.", name))
    }

    /// Check whether the output device disappeared
    ///
    /// Reports a loss once, pausing every deck, until another output device
    /// is selected.
    pub fn check_devices(&mut self) -> ConsoleResult<()> {
        if !self.output.device_lost() || self.device_lost_reported {
            return Ok(());
        }
        self.device_lost_reported = true;
        self.suspend_decks();
        Err(ConsoleError::DeviceUnavailable(
            "output device disconnected".to_string(),
        ))
    }

    fn suspend_decks(&mut self) {
        for deck in self.decks.iter_mut() {
            deck.suspend();
        }
    }

    fn start_microphone(&mut self) -> ConsoleResult<()> {
        let Some(input) = self.input.as_mut() else {
            return Ok(());
        };
        let feed = self.output.microphone_feed(self.mixer.microphone().clone());
        input.start(feed)?;
        self.microphone_running = true;
        log::info!("Console: microphone capture started");
        Ok(())
    }

    /// Stop capture before anything on the output side is torn down
    fn stop_microphone(&mut self) {
        if !self.microphone_running {
            return;
        }
        if let Some(input) = self.input.as_mut() {
            input.stop();
        }
        self.microphone_running = false;
        log::info!("Console: microphone capture stopped");
    }

    /// Stop the microphone, release both decks, then free the sink
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.stop_microphone();
        for deck in self.decks.iter_mut() {
            deck.unload();
        }
        self.output.free();
        log::info!("Console: shut down");
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.shutdown();
    }
}
