//! Step sizes and keymap overrides
//!
//! Both live in the player's YAML config:
//!
//! ```yaml
//! steps:
//!   change_volume: 0.05
//!   seek_amount: 50000
//! keymap:
//!   bindings:
//!     play_pause.both: "SHIFT+SPACE"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::KeymapError;
use crate::trigger::Trigger;

/// How far each nudge gesture moves its control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSteps {
    /// Master volume step, on the 0-100 scale
    pub change_master_volume: f32,
    pub change_pan: f32,
    pub change_volume: f32,
    /// Frequency step in Hz
    pub change_frequency: f32,
    /// Seek step in ticks
    pub seek_amount: u64,
    /// Crossfader step, on the -100..100 scale
    pub crossfade_amount: i32,
}

impl Default for ControlSteps {
    fn default() -> Self {
        Self {
            change_master_volume: 5.0,
            change_pan: 0.1,
            change_volume: 0.05,
            change_frequency: 100.0,
            seek_amount: 50000,
            crossfade_amount: 1,
        }
    }
}

impl ControlSteps {
    /// Clamp every step into its accepted range
    ///
    /// NaN steps fall back to their defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let clamp = |value: f32, min: f32, max: f32, default: f32| {
            if value.is_nan() {
                default
            } else {
                value.clamp(min, max)
            }
        };
        Self {
            change_master_volume: clamp(
                self.change_master_volume,
                0.0,
                100.0,
                defaults.change_master_volume,
            ),
            change_pan: clamp(self.change_pan, 0.0001, 2.0, defaults.change_pan),
            change_volume: clamp(self.change_volume, 0.00001, 1.0, defaults.change_volume),
            change_frequency: clamp(
                self.change_frequency,
                0.0001,
                199990.0,
                defaults.change_frequency,
            ),
            seek_amount: self.seek_amount.min(i64::MAX as u64),
            crossfade_amount: self.crossfade_amount.clamp(0, 100),
        }
    }
}

/// Trigger overrides, keyed by `command.binding`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    pub bindings: BTreeMap<String, Trigger>,
}

impl KeymapConfig {
    /// Rebind the named bindings of `commands`
    ///
    /// Fails on the first name that matches no binding.
    pub fn apply(&self, commands: &mut [Command]) -> Result<(), KeymapError> {
        for (name, trigger) in &self.bindings {
            let (command_name, binding_id) = name
                .split_once('.')
                .ok_or_else(|| KeymapError::UnknownBinding(name.clone()))?;

            let rebound = commands
                .iter_mut()
                .find(|c| c.name == command_name)
                .map_or(false, |c| c.rebind(binding_id, trigger.clone()));
            if !rebound {
                return Err(KeymapError::UnknownBinding(name.clone()));
            }
            log::info!("keymap: {} bound to {}", name, trigger);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_commands;

    #[test]
    fn test_default_steps() {
        let steps = ControlSteps::default();
        assert_eq!(steps.change_master_volume, 5.0);
        assert_eq!(steps.seek_amount, 50000);
        assert_eq!(steps.crossfade_amount, 1);
    }

    #[test]
    fn test_sanitized_clamps_into_range() {
        let steps = ControlSteps {
            change_master_volume: 250.0,
            change_pan: 0.0,
            change_volume: f32::NAN,
            change_frequency: -5.0,
            seek_amount: 10,
            crossfade_amount: 400,
        }
        .sanitized();

        assert_eq!(steps.change_master_volume, 100.0);
        assert_eq!(steps.change_pan, 0.0001);
        assert_eq!(steps.change_volume, 0.05);
        assert_eq!(steps.change_frequency, 0.0001);
        assert_eq!(steps.seek_amount, 10);
        assert_eq!(steps.crossfade_amount, 100);
    }

    #[test]
    fn test_partial_steps_yaml() {
        let steps: ControlSteps = serde_yaml::from_str("seek_amount: 1000\n").unwrap();
        assert_eq!(steps.seek_amount, 1000);
        assert_eq!(steps.change_pan, 0.1);
    }

    #[test]
    fn test_keymap_override_rebinds() {
        let mut commands = default_commands(&ControlSteps::default()).unwrap();
        let keymap: KeymapConfig =
            serde_yaml::from_str("bindings:\n  reset.left: \"ctrl+q\"\n").unwrap();
        keymap.apply(&mut commands).unwrap();

        let reset = commands.iter().find(|c| c.name == "reset").unwrap();
        assert_eq!(reset.binding("left").unwrap().trigger.as_str(), "CTRL+Q");
    }

    #[test]
    fn test_keymap_unknown_binding() {
        let mut commands = default_commands(&ControlSteps::default()).unwrap();
        for name in ["reset.middle", "nonsense.left", "reset"] {
            let mut keymap = KeymapConfig::default();
            keymap
                .bindings
                .insert(name.to_string(), Trigger::parse("F5").unwrap());
            assert_eq!(
                keymap.apply(&mut commands),
                Err(KeymapError::UnknownBinding(name.to_string()))
            );
        }
    }
}
