//! Twindeck Core - deck, mixer and audio engine for a two-deck console

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod sink;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ConsoleError, ConsoleResult};
pub use types::*;
