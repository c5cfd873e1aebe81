//! The built-in command list
//!
//! Commands are assembled here once at startup from the configured step
//! sizes. Default triggers are laid out for a US keyboard: the left deck
//! sits under the left hand, the right deck under the right.
//!
//! ```text
//!   Q W E R T     Y U I O P      reset / seek / volume
//!   A S D F G     H J K L ;      load / pan / play / crossfade
//!   Z X C         M , .          frequency / volume
//! ```

use twindeck_core::engine::{ConsoleCommand, DeckAction, MixerAction};
use twindeck_core::{DeckSide, DEFAULT_FREQUENCY};

use crate::command::{Command, Intent};
use crate::config::ControlSteps;
use crate::error::KeymapError;

use DeckSide::{Left, Right};

fn deck(side: DeckSide, action: DeckAction) -> ConsoleCommand {
    ConsoleCommand::deck(side, action)
}

fn mixer(action: MixerAction) -> ConsoleCommand {
    ConsoleCommand::Mixer(action)
}

/// Every command, with default triggers and the given step sizes
pub fn default_commands(steps: &ControlSteps) -> Result<Vec<Command>, KeymapError> {
    let steps = steps.sanitized();
    let seek = steps.seek_amount as i64;

    Ok(vec![
        Command::new("master_volume", "Alter the master volume.")
            .bind("up", "=", mixer(MixerAction::AdjustMaster(steps.change_master_volume)))?
            .bind("down", "-", mixer(MixerAction::AdjustMaster(-steps.change_master_volume)))?
            .bind("full", "SHIFT+=", mixer(MixerAction::FullMaster))?
            .bind("mute", "SHIFT+-", mixer(MixerAction::MuteMaster))?,
        Command::new("load", "Load a file onto a deck.")
            .bind("left", "A", Intent::LoadFile(Left))?
            .bind("right", ";", Intent::LoadFile(Right))?,
        Command::new("load_url", "Stream a URL on a deck.")
            .bind("left", "SHIFT+A", Intent::LoadUrl(Left))?
            .bind("right", "SHIFT+;", Intent::LoadUrl(Right))?,
        Command::new("play_pause", "Play or pause the deck.")
            .bind("left", "D", deck(Left, DeckAction::TogglePlay))?
            .bind("right", "K", deck(Right, DeckAction::TogglePlay))?
            .bind("both", "SPACE", ConsoleCommand::AllDecks(DeckAction::TogglePlay))?,
        Command::new("stop", "Stop a deck.")
            .bind("left", "SHIFT+D", deck(Left, DeckAction::Stop))?
            .bind("right", "SHIFT+K", deck(Right, DeckAction::Stop))?,
        Command::new("pan", "Set the pan of each deck.")
            .bind("left_left", "S", deck(Left, DeckAction::AdjustPan(-steps.change_pan)))?
            .bind("left_full_left", "SHIFT+S", deck(Left, DeckAction::SetPan(-1.0)))?
            .bind("left_right", "F", deck(Left, DeckAction::AdjustPan(steps.change_pan)))?
            .bind("left_full_right", "SHIFT+F", deck(Left, DeckAction::SetPan(1.0)))?
            .bind("right_left", "J", deck(Right, DeckAction::AdjustPan(-steps.change_pan)))?
            .bind("right_full_left", "SHIFT+J", deck(Right, DeckAction::SetPan(-1.0)))?
            .bind("right_right", "L", deck(Right, DeckAction::AdjustPan(steps.change_pan)))?
            .bind("right_full_right", "SHIFT+L", deck(Right, DeckAction::SetPan(1.0)))?,
        Command::new("reset", "Reset a deck.")
            .bind("left", "Q", deck(Left, DeckAction::Reset))?
            .bind("right", "P", deck(Right, DeckAction::Reset))?,
        Command::new("volume", "Set the volume of a deck.")
            .bind("left_up", "E", deck(Left, DeckAction::AdjustVolume(steps.change_volume)))?
            .bind("left_down", "X", deck(Left, DeckAction::AdjustVolume(-steps.change_volume)))?
            .bind("right_up", "I", deck(Right, DeckAction::AdjustVolume(steps.change_volume)))?
            .bind("right_down", ",", deck(Right, DeckAction::AdjustVolume(-steps.change_volume)))?,
        Command::new("full_volume", "Set the deck to full volume.")
            .bind("left", "SHIFT+E", deck(Left, DeckAction::SetVolume(1.0)))?
            .bind("right", "SHIFT+I", deck(Right, DeckAction::SetVolume(1.0)))?,
        Command::new("mute_volume", "Mute a deck.")
            .bind("left", "SHIFT+X", deck(Left, DeckAction::SetVolume(0.0)))?
            .bind("right", "SHIFT+,", deck(Right, DeckAction::SetVolume(0.0)))?,
        Command::new("frequency", "Set the frequency of a deck.")
            .bind("left_up", "C", deck(Left, DeckAction::AdjustFrequency(steps.change_frequency)))?
            .bind("left_down", "Z", deck(Left, DeckAction::AdjustFrequency(-steps.change_frequency)))?
            .bind("right_up", ".", deck(Right, DeckAction::AdjustFrequency(steps.change_frequency)))?
            .bind("right_down", "M", deck(Right, DeckAction::AdjustFrequency(-steps.change_frequency)))?,
        Command::new("reset_frequency", "Reset the frequency of a deck.")
            .bind("left", "SHIFT+Q", deck(Left, DeckAction::SetFrequency(DEFAULT_FREQUENCY)))?
            .bind("right", "SHIFT+P", deck(Right, DeckAction::SetFrequency(DEFAULT_FREQUENCY)))?,
        Command::new("reset_pan", "Reset the pan of a deck.")
            .bind("left", "SHIFT+T", deck(Left, DeckAction::SetPan(0.0)))?
            .bind("right", "SHIFT+Y", deck(Right, DeckAction::SetPan(0.0)))?,
        Command::new("seek", "Seek through a deck.")
            .bind("left_back", "W", deck(Left, DeckAction::Seek { amount: -seek, absolute: false }))?
            .bind("left_start", "SHIFT+W", deck(Left, DeckAction::Seek { amount: 0, absolute: true }))?
            .bind("left_forward", "R", deck(Left, DeckAction::Seek { amount: seek, absolute: false }))?
            .bind("right_back", "U", deck(Right, DeckAction::Seek { amount: -seek, absolute: false }))?
            .bind("right_start", "SHIFT+U", deck(Right, DeckAction::Seek { amount: 0, absolute: true }))?
            .bind("right_forward", "O", deck(Right, DeckAction::Seek { amount: seek, absolute: false }))?,
        Command::new("crossfade", "Crossfade between the two decks.")
            .bind(
                "left",
                "G",
                mixer(MixerAction::NudgeCrossfader {
                    toward: Left,
                    amount: steps.crossfade_amount,
                }),
            )?
            .bind(
                "right",
                "H",
                mixer(MixerAction::NudgeCrossfader {
                    toward: Right,
                    amount: steps.crossfade_amount,
                }),
            )?
            .bind("centre", "Y", mixer(MixerAction::CenterCrossfader))?
            .bind("cut_left", "SHIFT+G", mixer(MixerAction::CutCrossfader(Left)))?
            .bind("cut_right", "SHIFT+H", mixer(MixerAction::CutCrossfader(Right)))?,
        Command::new("microphone", "Toggle the microphone.")
            .bind("toggle", "/", mixer(MixerAction::ToggleMicrophone))?,
        Command::new("microphone_pan", "Change the microphone pan.")
            .bind("left", "[", mixer(MixerAction::AdjustMicrophonePan(-steps.change_pan)))?
            .bind("full_left", "SHIFT+[", mixer(MixerAction::SetMicrophonePan(-1.0)))?
            .bind("right", "]", mixer(MixerAction::AdjustMicrophonePan(steps.change_pan)))?
            .bind("full_right", "SHIFT+]", mixer(MixerAction::SetMicrophonePan(1.0)))?,
        Command::new("reset_microphone", "Reset the microphone settings.")
            .bind("reset", "RETURN", mixer(MixerAction::ResetMicrophone))?,
        Command::new("progress", "Speak the position of a deck.")
            .bind("left", "SHIFT+R", deck(Left, DeckAction::ReportProgress))?
            .bind("right", "SHIFT+O", deck(Right, DeckAction::ReportProgress))?,
        Command::new("play_state", "Speak the play state of a deck.")
            .bind("left", "SHIFT+Z", deck(Left, DeckAction::ReportPlayState))?
            .bind("right", "SHIFT+M", deck(Right, DeckAction::ReportPlayState))?,
        Command::new("devices", "Change audio devices.")
            .bind("input", "F11", Intent::ChooseInput)?
            .bind("output", "F12", Intent::ChooseOutput)?,
        Command::new("help", "Show the hotkey list or toggle help mode.")
            .bind("usage", "F1", Intent::ShowHelp)?
            .bind("help_mode", "SHIFT+/", Intent::ToggleHelpMode)?,
    ])
}
