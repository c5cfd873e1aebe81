//! Trigger dispatch
//!
//! The router owns the command list and a trigger index built from it.
//! Lookup is a single hash probe:
//!
//! ```text
//! Trigger ──► HashMap<Trigger, (command, binding)> ──► Intent
//! ```
//!
//! Registration refuses overlapping triggers outright. A command whose
//! triggers collide with an earlier one is rejected as a whole and the
//! router is left as it was.

use std::collections::HashMap;
use std::fmt::Write;

use crate::catalog::default_commands;
use crate::command::{Command, Intent};
use crate::config::{ControlSteps, KeymapConfig};
use crate::error::KeymapError;
use crate::trigger::Trigger;

/// Outcome of dispatching one trigger
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Carry out this intent
    Run(Intent),
    /// Help mode is on: tell the operator what the command would do
    Describe {
        name: &'static str,
        description: &'static str,
    },
    /// Nothing is bound to the trigger
    Unbound,
}

/// Trigger-to-command routing table
#[derive(Debug, Default)]
pub struct CommandRouter {
    commands: Vec<Command>,
    index: HashMap<Trigger, (usize, usize)>,
    help_mode: bool,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every command in order, stopping at the first collision
    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Result<Self, KeymapError> {
        let mut router = Self::new();
        for command in commands {
            router.register(command)?;
        }
        Ok(router)
    }

    /// The built-in commands with `steps` and `keymap` applied
    pub fn with_keymap(steps: &ControlSteps, keymap: &KeymapConfig) -> Result<Self, KeymapError> {
        let mut commands = default_commands(steps)?;
        keymap.apply(&mut commands)?;
        let router = Self::from_commands(commands)?;
        log::info!(
            "CommandRouter: {} commands, {} triggers",
            router.commands.len(),
            router.index.len()
        );
        Ok(router)
    }

    /// Add a command
    ///
    /// Fails with [`KeymapError::InvalidTrigger`] if any of its triggers is
    /// already taken, by another command or by another of its own bindings.
    pub fn register(&mut self, command: Command) -> Result<(), KeymapError> {
        let command_index = self.commands.len();
        let mut claimed: HashMap<&Trigger, String> = HashMap::new();

        for binding in &command.bindings {
            let incoming = command.qualified(binding);
            let existing = match self.index.get(&binding.trigger) {
                Some(&(c, b)) => Some(self.commands[c].qualified(&self.commands[c].bindings[b])),
                None => claimed.get(&binding.trigger).cloned(),
            };
            if let Some(existing) = existing {
                log::error!(
                    "CommandRouter: {} wants {}, already bound to {}",
                    incoming,
                    binding.trigger,
                    existing
                );
                return Err(KeymapError::InvalidTrigger {
                    trigger: binding.trigger.to_string(),
                    existing,
                    incoming,
                });
            }
            claimed.insert(&binding.trigger, incoming);
        }

        for (binding_index, binding) in command.bindings.iter().enumerate() {
            self.index
                .insert(binding.trigger.clone(), (command_index, binding_index));
        }
        log::debug!("CommandRouter: registered {}", command.name);
        self.commands.push(command);
        Ok(())
    }

    /// Resolve a trigger
    ///
    /// In help mode every command is described instead of run, except the
    /// toggle that leaves help mode.
    pub fn dispatch(&self, trigger: &Trigger) -> Dispatch {
        let Some(&(c, b)) = self.index.get(trigger) else {
            return Dispatch::Unbound;
        };
        let command = &self.commands[c];
        let intent = &command.bindings[b].intent;

        if self.help_mode && *intent != Intent::ToggleHelpMode {
            return Dispatch::Describe {
                name: command.name,
                description: command.description,
            };
        }
        log::debug!("CommandRouter: {} -> {}", trigger, command.name);
        Dispatch::Run(intent.clone())
    }

    pub fn help_mode(&self) -> bool {
        self.help_mode
    }

    /// Flip help mode, returning the new state
    pub fn toggle_help_mode(&mut self) -> bool {
        self.help_mode = !self.help_mode;
        log::info!("Help mode {}", if self.help_mode { "enabled" } else { "disabled" });
        self.help_mode
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Whether anything is bound to `trigger`
    pub fn is_bound(&self, trigger: &Trigger) -> bool {
        self.index.contains_key(trigger)
    }

    /// The hotkey listing: each description followed by its triggers
    pub fn usage(&self) -> String {
        let mut text = String::from("Usage:\n\n");
        for command in &self.commands {
            let keys: Vec<&str> = command.keys().map(Trigger::as_str).collect();
            let _ = write!(text, "{}\n{}\n\n", command.description, keys.join(", "));
        }
        text
    }
}
