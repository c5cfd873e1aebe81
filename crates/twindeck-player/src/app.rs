//! Event loop
//!
//! ```text
//! crossterm key ──► Trigger ──► CommandRouter ──► Intent
//!                                                   ├─ Console(cmd) ──► Console::apply ──► announcement
//!                                                   └─ UI request   ──► prompt ──► Console::apply
//! ```
//!
//! Device loss is polled between key events; a lost output pauses both
//! decks and is announced once.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use twindeck_core::engine::{Console, ConsoleCommand, DeckAction};
use twindeck_keys::{CommandRouter, Dispatch, Intent, Trigger};

use crate::terminal::{is_quit, key_to_trigger, Operator};

/// How long to wait for a key before polling devices again
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Whether the loop keeps going after a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    console: Console,
    router: CommandRouter,
}

impl App {
    pub fn new(console: Console, router: CommandRouter) -> Self {
        Self { console, router }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// Read keys until the operator quits
    pub fn run<O: Operator>(&mut self, operator: &mut O) -> Result<()> {
        operator.say("Twindeck ready. Press F1 for hotkeys, Ctrl+Q to quit.");
        loop {
            self.poll_devices(operator);

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(trigger) = key_to_trigger(&key) else {
                continue;
            };
            if self.handle_trigger(&trigger, operator)? == Flow::Quit {
                break;
            }
        }
        log::info!("App: quit requested");
        Ok(())
    }

    /// Announce a lost device, once per loss
    pub fn poll_devices<O: Operator>(&mut self, operator: &mut O) {
        if let Err(e) = self.console.check_devices() {
            log::warn!("App: {}", e);
            operator.say(&format!("{}. Decks paused; press F12 to pick an output.", e));
        }
    }

    /// Route one trigger
    pub fn handle_trigger<O: Operator>(&mut self, trigger: &Trigger, operator: &mut O) -> Result<Flow> {
        match self.router.dispatch(trigger) {
            Dispatch::Run(intent) => {
                log::debug!("App: {} -> {:?}", trigger, intent);
                self.perform(intent, operator)?;
            }
            Dispatch::Describe { description, .. } => operator.say(description),
            Dispatch::Unbound if is_quit(trigger) => return Ok(Flow::Quit),
            Dispatch::Unbound => log::debug!("App: {} is not bound", trigger),
        }
        Ok(Flow::Continue)
    }

    fn perform<O: Operator>(&mut self, intent: Intent, operator: &mut O) -> Result<()> {
        match intent {
            Intent::Console(command) => self.apply(command, operator),
            Intent::LoadFile(side) => {
                let question = format!("File to load on the {} deck: ", side);
                if let Some(path) = operator.ask(&question)? {
                    self.apply(load(side, path, false), operator);
                }
            }
            Intent::LoadUrl(side) => {
                let question = format!("URL to stream on the {} deck: ", side);
                if let Some(url) = operator.ask(&question)? {
                    self.apply(load(side, url, true), operator);
                }
            }
            Intent::ChooseOutput => {
                let devices = self.console.output_devices();
                if let Some(index) = operator.choose("Choose a new output device", &devices)? {
                    self.apply(ConsoleCommand::SelectOutput(index), operator);
                }
            }
            Intent::ChooseInput => {
                let devices = self.console.input_devices();
                if let Some(index) = operator.choose("Choose a new input device", &devices)? {
                    self.apply(ConsoleCommand::SelectInput(index), operator);
                }
            }
            Intent::ShowHelp => operator.say(&self.router.usage()),
            Intent::ToggleHelpMode => {
                let enabled = self.router.toggle_help_mode();
                operator.say(if enabled {
                    "Help mode enabled."
                } else {
                    "Help mode disabled."
                });
            }
        }
        Ok(())
    }

    fn apply<O: Operator>(&mut self, command: ConsoleCommand, operator: &mut O) {
        match self.console.apply(command) {
            Ok(announcement) => operator.say(&announcement),
            Err(e) => {
                log::warn!("App: {}", e);
                operator.say(&e.to_string());
            }
        }
    }

    /// Stop audio and hand back the console's resources
    pub fn shutdown(&mut self) {
        self.console.shutdown();
    }
}

fn load(side: twindeck_core::DeckSide, source_ref: String, is_url: bool) -> ConsoleCommand {
    ConsoleCommand::deck(side, DeckAction::Load { source_ref, is_url })
}
