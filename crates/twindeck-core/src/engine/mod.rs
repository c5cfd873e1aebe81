//! Console engine - Deck, Mixer, microphone handoff
//!
//! This module contains the control side of the console:
//! - Deck: one playback slot with its own source and parameters
//! - Mixer: crossfader gain law, master volume, microphone levels
//! - Microphone: lock-free handoff from capture to output
//! - Console: both decks and the mixer behind a single command entry point

mod command;
mod console;
mod deck;
mod microphone;
mod mixer;

pub use command::*;
pub use console::*;
pub use deck::*;
pub use microphone::*;
pub use mixer::*;
