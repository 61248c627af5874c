//! Keystroke model
//!
//! WebDriver smuggles special keys through private-use code points. We don't:
//! a [`Keys`] sequence is a list of literal characters and named [`Key`]s, so a
//! test can assert on exactly what was typed.

use serde::{Deserialize, Serialize};

/// Non-printing keys the page layer needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
}

impl Key {
    /// DOM `KeyboardEvent.key` value (also valid as `code` for these keys)
    pub fn name(self) -> &'static str {
        match self {
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Enter => "Enter",
            Key::Tab => "Tab",
            Key::Escape => "Escape",
        }
    }

    /// Windows virtual key code, required by Chrome for editing keys to take effect
    pub fn virtual_key_code(self) -> u32 {
        match self {
            Key::Backspace => 8,
            Key::Tab => 9,
            Key::Enter => 13,
            Key::Escape => 27,
            Key::Delete => 46,
        }
    }

    /// Text the key produces, if any
    pub fn text(self) -> Option<&'static str> {
        match self {
            Key::Enter => Some("\r"),
            Key::Tab => Some("\t"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keystroke {
    Char(char),
    Key(Key),
}

/// Ordered keystroke sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Keys(Vec<Keystroke>);

impl Keys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, text: &str) -> &mut Self {
        self.0.extend(text.chars().map(Keystroke::Char));
        self
    }

    pub fn push_key(&mut self, key: Key) -> &mut Self {
        self.0.push(Keystroke::Key(key));
        self
    }

    pub fn strokes(&self) -> &[Keystroke] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into maximal runs: literal text is batched, special keys stand alone
    pub fn runs(&self) -> Vec<KeyRun> {
        let mut runs = Vec::new();
        let mut text = String::new();

        for stroke in &self.0 {
            match stroke {
                Keystroke::Char(c) => text.push(*c),
                Keystroke::Key(key) => {
                    if !text.is_empty() {
                        runs.push(KeyRun::Text(std::mem::take(&mut text)));
                    }
                    runs.push(KeyRun::Key(*key));
                }
            }
        }
        if !text.is_empty() {
            runs.push(KeyRun::Text(text));
        }

        runs
    }
}

/// A batch of keystrokes a backend can deliver in one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRun {
    Text(String),
    Key(Key),
}

impl From<&str> for Keys {
    fn from(text: &str) -> Self {
        let mut keys = Keys::new();
        keys.push_text(text);
        keys
    }
}

impl From<Key> for Keys {
    fn from(key: Key) -> Self {
        Keys(vec![Keystroke::Key(key)])
    }
}

impl FromIterator<Keystroke> for Keys {
    fn from_iter<I: IntoIterator<Item = Keystroke>>(iter: I) -> Self {
        Keys(iter.into_iter().collect())
    }
}

impl Extend<Keystroke> for Keys {
    fn extend<I: IntoIterator<Item = Keystroke>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Keys {
    type Item = &'a Keystroke;
    type IntoIter = std::slice::Iter<'a, Keystroke>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
