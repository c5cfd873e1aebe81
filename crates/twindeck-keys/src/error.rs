//! Keymap error types

use thiserror::Error;

/// Errors raised while building the hotkey table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    /// Two bindings claim the same trigger
    #[error("Trigger {trigger} is bound to both {existing} and {incoming}")]
    InvalidTrigger {
        trigger: String,
        existing: String,
        incoming: String,
    },

    /// A trigger string that does not name a key
    #[error("Malformed trigger: {0:?}")]
    MalformedTrigger(String),

    /// A keymap override for a binding that does not exist
    #[error("Unknown binding in keymap: {0}")]
    UnknownBinding(String),
}
