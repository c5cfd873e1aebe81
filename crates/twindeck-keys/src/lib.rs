//! Hotkey commands for the twindeck console
//!
//! This crate provides:
//! - Normalised [`Trigger`] tokens for key gestures
//! - [`Command`] records binding triggers to console intents
//! - The built-in command list with configurable step sizes
//! - [`CommandRouter`], the O(1) trigger lookup with help mode
//!
//! # Architecture
//!
//! ```text
//! key event → Trigger → CommandRouter::dispatch → Intent → Console::apply
//!                                                       └→ prompt (load, devices, help)
//! ```
//!
//! Overlapping triggers are a setup error: building the router fails with
//! [`KeymapError::InvalidTrigger`] before any key is dispatched.

mod catalog;
mod command;
mod config;
mod error;
mod router;
mod trigger;

pub use catalog::default_commands;
pub use command::{Binding, Command, Intent};
pub use config::{ControlSteps, KeymapConfig};
pub use error::KeymapError;
pub use router::{CommandRouter, Dispatch};
pub use trigger::{Modifiers, Trigger};
