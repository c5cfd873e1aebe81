//! Terminal input and output
//!
//! The console runs with the terminal in raw mode so single key presses
//! arrive without waiting for Enter. Prompts drop back to cooked mode for
//! the length of one line.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use twindeck_keys::{Modifiers, Trigger};

/// The base key and shift state that type a US-layout symbol
fn unshift(c: char) -> Option<char> {
    Some(match c {
        '!' => '1',
        '@' => '2',
        '#' => '3',
        '$' => '4',
        '%' => '5',
        '^' => '6',
        '&' => '7',
        '*' => '8',
        '(' => '9',
        ')' => '0',
        '_' => '-',
        '+' => '=',
        '{' => '[',
        '}' => ']',
        '|' => '\\',
        ':' => ';',
        '"' => '\'',
        '<' => ',',
        '>' => '.',
        '?' => '/',
        '~' => '`',
        _ => return None,
    })
}

/// Translate a key press into a trigger
///
/// Returns None for key releases and keys that have no trigger name.
pub fn key_to_trigger(key: &KeyEvent) -> Option<Trigger> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let mut modifiers = Modifiers {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    };

    let name = match key.code {
        KeyCode::Char(' ') => "SPACE".to_string(),
        KeyCode::Char(c) if c.is_alphabetic() => {
            modifiers.shift |= c.is_uppercase();
            c.to_uppercase().collect()
        }
        KeyCode::Char(c) => match unshift(c) {
            Some(base) => {
                modifiers.shift = true;
                base.to_string()
            }
            None => c.to_string(),
        },
        KeyCode::Enter => "RETURN".to_string(),
        KeyCode::Esc => "ESCAPE".to_string(),
        KeyCode::Tab => "TAB".to_string(),
        KeyCode::BackTab => {
            modifiers.shift = true;
            "TAB".to_string()
        }
        KeyCode::Backspace => "BACKSPACE".to_string(),
        KeyCode::Delete => "DELETE".to_string(),
        KeyCode::Insert => "INSERT".to_string(),
        KeyCode::Home => "HOME".to_string(),
        KeyCode::End => "END".to_string(),
        KeyCode::PageUp => "PAGEUP".to_string(),
        KeyCode::PageDown => "PAGEDOWN".to_string(),
        KeyCode::Left => "LEFT".to_string(),
        KeyCode::Right => "RIGHT".to_string(),
        KeyCode::Up => "UP".to_string(),
        KeyCode::Down => "DOWN".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => return None,
    };

    Trigger::compose(modifiers, &name).ok()
}

/// Whether an unbound trigger should end the session
pub fn is_quit(trigger: &Trigger) -> bool {
    matches!(trigger.as_str(), "CTRL+Q" | "ESCAPE")
}

/// How the app talks to the person at the keyboard
pub trait Operator {
    /// Show a short message
    fn say(&mut self, text: &str);

    /// Ask for a line of text; None when the answer is empty
    fn ask(&mut self, question: &str) -> Result<Option<String>>;

    /// Offer a numbered list; None when nothing valid was picked
    fn choose(&mut self, title: &str, options: &[String]) -> Result<Option<usize>>;
}

/// Parse a 1-based menu answer into an index
pub fn parse_choice(answer: &str, len: usize) -> Option<usize> {
    match answer.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

/// Clean up a typed or dropped path: trims whitespace and one pair of quotes
pub fn clean_answer(answer: &str) -> Option<String> {
    let answer = answer.trim();
    let answer = ['"', '\'']
        .iter()
        .find_map(|&q| answer.strip_prefix(q).and_then(|a| a.strip_suffix(q)))
        .unwrap_or(answer)
        .trim();
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}

/// Raw-mode terminal; restores cooked mode when dropped
pub struct Terminal {
    stdout: io::Stdout,
}

impl Terminal {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw terminal mode")?;
        Ok(Self { stdout: io::stdout() })
    }

    /// Write text, translating newlines for raw mode
    pub fn print(&mut self, text: &str) {
        let mut out = self.stdout.lock();
        for line in text.lines() {
            let _ = write!(out, "{}\r\n", line);
        }
        let _ = out.flush();
    }

    fn read_line(&mut self, question: &str) -> Result<String> {
        disable_raw_mode().context("Failed to leave raw terminal mode")?;
        print!("{}", question);
        let _ = io::stdout().flush();

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line);
        enable_raw_mode().context("Failed to re-enable raw terminal mode")?;
        read.context("Failed to read from the terminal")?;
        Ok(line)
    }
}

impl Operator for Terminal {
    fn say(&mut self, text: &str) {
        self.print(text);
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let line = self.read_line(question)?;
        Ok(clean_answer(&line))
    }

    fn choose(&mut self, title: &str, options: &[String]) -> Result<Option<usize>> {
        if options.is_empty() {
            self.print("No devices found.");
            return Ok(None);
        }
        self.print(title);
        for (i, option) in options.iter().enumerate() {
            self.print(&format!("  {}. {}", i + 1, option));
        }
        let line = self.read_line("Number (Enter to cancel): ")?;
        Ok(parse_choice(&line, options.len()))
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::warn!("Failed to restore terminal: {}", e);
        }
    }
}
