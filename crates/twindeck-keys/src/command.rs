//! Command records
//!
//! A [`Command`] is plain data: a name, a description for the help page and
//! a list of named [`Binding`]s. Each binding pairs one trigger with the
//! fully resolved [`Intent`] it stands for, so the deck a gesture targets
//! comes from which trigger fired.

use twindeck_core::engine::ConsoleCommand;
use twindeck_core::DeckSide;

use crate::error::KeymapError;
use crate::trigger::Trigger;

/// What a trigger asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Apply a command to the console
    Console(ConsoleCommand),
    /// Ask the operator for a file to load on a deck
    LoadFile(DeckSide),
    /// Ask the operator for a URL to stream on a deck
    LoadUrl(DeckSide),
    /// Ask the operator to pick an output device
    ChooseOutput,
    /// Ask the operator to pick a microphone device
    ChooseInput,
    /// Show the hotkey listing
    ShowHelp,
    /// Switch help mode on or off
    ToggleHelpMode,
}

impl From<ConsoleCommand> for Intent {
    fn from(command: ConsoleCommand) -> Self {
        Intent::Console(command)
    }
}

/// One trigger of a command
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Name within the command, e.g. `left_up`
    pub id: &'static str,
    pub trigger: Trigger,
    pub intent: Intent,
}

/// A named group of bindings
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub bindings: Vec<Binding>,
}

impl Command {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            bindings: Vec::new(),
        }
    }

    /// Add a binding
    ///
    /// A malformed trigger literal fails the whole command rather than
    /// leaving the gesture unbound.
    pub(crate) fn bind(
        mut self,
        id: &'static str,
        trigger: &str,
        intent: impl Into<Intent>,
    ) -> Result<Self, KeymapError> {
        let trigger = Trigger::parse(trigger).map_err(|e| {
            log::error!("Command {}: bad trigger for {}: {}", self.name, id, e);
            e
        })?;
        self.bindings.push(Binding {
            id,
            trigger,
            intent: intent.into(),
        });
        Ok(self)
    }

    /// Every trigger this command answers to
    pub fn keys(&self) -> impl Iterator<Item = &Trigger> {
        self.bindings.iter().map(|b| &b.trigger)
    }

    /// The intent for `trigger`, if it belongs to this command
    pub fn run(&self, trigger: &Trigger) -> Option<Intent> {
        self.bindings
            .iter()
            .find(|b| &b.trigger == trigger)
            .map(|b| b.intent.clone())
    }

    pub fn binding(&self, id: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    /// Move a binding to a new trigger; false if there is no such binding
    pub fn rebind(&mut self, id: &str, trigger: Trigger) -> bool {
        match self.bindings.iter_mut().find(|b| b.id == id) {
            Some(binding) => {
                binding.trigger = trigger;
                true
            }
            None => false,
        }
    }

    /// `command.binding` name of one of this command's bindings
    pub fn qualified(&self, binding: &Binding) -> String {
        format!("{}.{}", self.name, binding.id)
    }
}
