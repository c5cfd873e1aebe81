//! Player configuration for twindeck
//!
//! Configuration is stored as YAML in the user's config directory.
//! Default location: ~/.config/twindeck/config.yaml
//!
//! ```yaml
//! audio:
//!   buffer_size: LowLatency
//!   microphone: true
//! steps:
//!   seek_amount: 100000
//! keymap:
//!   bindings:
//!     reset.left: "CTRL+Q"
//! ```

use serde::{Deserialize, Serialize};
use twindeck_core::audio::AudioConfig;
use twindeck_keys::{ControlSteps, KeymapConfig};

pub use twindeck_core::config::{default_config_path, default_log_path, load_config, save_config};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Devices, buffer size and microphone capture
    pub audio: AudioConfig,
    /// How far each nudge key moves its control
    pub steps: ControlSteps,
    /// Trigger overrides for the built-in commands
    pub keymap: KeymapConfig,
}
