//! Trigger tokens
//!
//! A [`Trigger`] names one hotkey gesture as a normalised string such as
//! `SHIFT+=` or `CTRL+ALT+F11`. Normalisation makes triggers from config
//! files and from the terminal compare equal:
//!
//! - Modifiers always appear in the order `CTRL+ALT+SHIFT+`
//! - Key names are upper case (`A`, `SPACE`, `RETURN`, `F11`)
//! - Punctuation keys are kept as-is (`;`, `,`, `[`)
//!
//! Parsing is case-insensitive, so `shift+a` and `SHIFT+A` are the same
//! trigger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeymapError;

/// Modifier keys held with a trigger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: true,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
    };
}

/// A normalised hotkey token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Trigger(String);

impl Trigger {
    /// Build a trigger from modifiers and a key name
    pub fn compose(modifiers: Modifiers, key: &str) -> Result<Self, KeymapError> {
        let key = normalize_key(key).ok_or_else(|| KeymapError::MalformedTrigger(key.to_string()))?;

        let mut token = String::with_capacity(key.len() + 15);
        if modifiers.ctrl {
            token.push_str("CTRL+");
        }
        if modifiers.alt {
            token.push_str("ALT+");
        }
        if modifiers.shift {
            token.push_str("SHIFT+");
        }
        token.push_str(&key);
        Ok(Self(token))
    }

    /// Parse a trigger string such as `shift+a`
    pub fn parse(s: &str) -> Result<Self, KeymapError> {
        s.parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Canonical spelling of a key name, or None if it is not one
fn normalize_key(key: &str) -> Option<String> {
    if key == " " {
        return Some("SPACE".to_string());
    }
    let key = key.trim();
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (None, _) => None,
        (Some(c), None) if c.is_whitespace() => None,
        (Some(c), None) => Some(c.to_uppercase().collect()),
        _ => {
            if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
                return None;
            }
            let upper = key.to_ascii_uppercase();
            Some(match upper.as_str() {
                "ENTER" => "RETURN".to_string(),
                "ESC" => "ESCAPE".to_string(),
                "DEL" => "DELETE".to_string(),
                _ => upper,
            })
        }
    }
}

impl FromStr for Trigger {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || KeymapError::MalformedTrigger(s.to_string());
        let text = s.trim();
        if text.is_empty() {
            return Err(malformed());
        }

        // A trailing '+' is only valid as the plus key itself: "+" or "SHIFT++"
        let (prefix, key) = match text.strip_suffix('+') {
            Some("") => ("", "+"),
            Some(rest) if rest.ends_with('+') => (&rest[..rest.len() - 1], "+"),
            Some(_) => return Err(malformed()),
            None => match text.rfind('+') {
                Some(i) => (&text[..i], &text[i + 1..]),
                None => ("", text),
            },
        };

        let mut modifiers = Modifiers::NONE;
        if !prefix.is_empty() {
            for part in prefix.split('+') {
                match part.trim().to_ascii_uppercase().as_str() {
                    "CTRL" | "CONTROL" => modifiers.ctrl = true,
                    "ALT" => modifiers.alt = true,
                    "SHIFT" => modifiers.shift = true,
                    _ => return Err(malformed()),
                }
            }
        }

        Trigger::compose(modifiers, key).map_err(|_| malformed())
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Trigger {
    type Error = KeymapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.0
    }
}
