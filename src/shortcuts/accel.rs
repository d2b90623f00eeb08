//! Accelerator codec: keyboard chords and their canonical text form.
//!
//! This module provides:
//! - `Accelerator` - a normalized (key, modifier-set) pair
//! - `KeyCode` - the key half of a chord (character or named key)
//! - `Mods` - the host modifier bitmask, with lock bits masked out
//! - Text parsing/formatting with the round-trip law
//!   `parse(format(a)) == a`
//!
//! Canonical text grammar: optional `Shift+`, `Ctrl+`, `Alt+` prefixes in
//! that order, then either a single printable character (stored upper-case)
//! or a multi-character key name from the key-name table. The space and
//! backslash characters render as the literal words `Space` / `Backslash`.
//! The empty string is the unbound accelerator.

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

/// Errors that can occur when parsing accelerator text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccelParseError {
    #[error("accelerator has no key, only modifiers")]
    MissingKey,
    #[error("multiple keys in accelerator, found '{0}' after a key")]
    MultipleKeys(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

bitflags! {
    /// Modifier bitmask as delivered by the host UI.
    ///
    /// Only `SHIFT`, `CONTROL` and `ALT` participate in accelerator
    /// equality and dispatch matching; the lock and auxiliary bits exist so
    /// a raw host state can be represented before masking.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Mods: u16 {
        const SHIFT    = 1 << 0;
        const LOCK     = 1 << 1;
        const CONTROL  = 1 << 2;
        const ALT      = 1 << 3;
        const NUM_LOCK = 1 << 4;
        const SUPER    = 1 << 6;
        const HYPER    = 1 << 7;
    }
}

impl Mods {
    /// The modifiers that participate in equality and matching.
    pub const BINDABLE: Mods = Mods::SHIFT.union(Mods::CONTROL).union(Mods::ALT);

    /// Drop lock and auxiliary bits, keeping only the bindable modifiers.
    pub fn masked(self) -> Self {
        self.intersection(Self::BINDABLE)
    }
}

/// The key half of an accelerator.
///
/// `Char` holds a single printable character, stored upper-case. The raw
/// modifier keys at the end exist only so the capture flow can recognize a
/// bare modifier press and ignore it; they are never parseable from text
/// and never bindable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    Char(char),
    Space,
    Backslash,
    Tab,
    Return,
    Escape,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
}

/// Name table for multi-character keys, shared by parse and format.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Space", KeyCode::Space),
    ("Backslash", KeyCode::Backslash),
    ("Tab", KeyCode::Tab),
    ("Return", KeyCode::Return),
    ("Escape", KeyCode::Escape),
    ("Backspace", KeyCode::Backspace),
    ("Delete", KeyCode::Delete),
    ("Insert", KeyCode::Insert),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("F1", KeyCode::F1),
    ("F2", KeyCode::F2),
    ("F3", KeyCode::F3),
    ("F4", KeyCode::F4),
    ("F5", KeyCode::F5),
    ("F6", KeyCode::F6),
    ("F7", KeyCode::F7),
    ("F8", KeyCode::F8),
    ("F9", KeyCode::F9),
    ("F10", KeyCode::F10),
    ("F11", KeyCode::F11),
    ("F12", KeyCode::F12),
];

impl KeyCode {
    /// True for the raw modifier keys (bare Shift/Ctrl/Alt presses), which
    /// the capture flow ignores rather than treating as a candidate.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            KeyCode::ShiftLeft
                | KeyCode::ShiftRight
                | KeyCode::ControlLeft
                | KeyCode::ControlRight
                | KeyCode::AltLeft
                | KeyCode::AltRight
        )
    }

    /// Canonical form: space and backslash characters become their named
    /// keys, letters are stored upper-case.
    fn canonicalize(self) -> Self {
        match self {
            KeyCode::Char(' ') => KeyCode::Space,
            KeyCode::Char('\\') => KeyCode::Backslash,
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_uppercase()),
            other => other,
        }
    }

    fn name(self) -> Option<&'static str> {
        NAMED_KEYS
            .iter()
            .find(|(_, code)| *code == self)
            .map(|(name, _)| *name)
    }
}

/// Resolve a key token to a `KeyCode`.
///
/// Named keys are matched case-insensitively (with a few aliases); any
/// other single printable character maps to `Char`.
fn parse_key(token: &str) -> Result<KeyCode, AccelParseError> {
    let lower = token.to_lowercase();
    for (name, code) in NAMED_KEYS {
        if name.to_lowercase() == lower {
            return Ok(*code);
        }
    }
    match lower.as_str() {
        "esc" => return Ok(KeyCode::Escape),
        "enter" => return Ok(KeyCode::Return),
        "del" => return Ok(KeyCode::Delete),
        "pgup" | "prior" => return Ok(KeyCode::PageUp),
        "pgdn" | "next" => return Ok(KeyCode::PageDown),
        _ => {}
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(KeyCode::Char(c).canonicalize()),
        _ => Err(AccelParseError::UnknownKey(token.to_string())),
    }
}

/// One keyboard chord: a key plus the bindable modifier set.
///
/// `key == None` is the unbound accelerator. Lock and auxiliary modifier
/// bits are masked out on construction, so two accelerators that differ
/// only in those bits compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Accelerator {
    key: Option<KeyCode>,
    mods: Mods,
}

impl Accelerator {
    /// The unbound accelerator: no key, no modifiers.
    pub const UNBOUND: Accelerator = Accelerator {
        key: None,
        mods: Mods::empty(),
    };

    pub fn new(key: KeyCode, mods: Mods) -> Self {
        Self {
            key: Some(key.canonicalize()),
            mods: mods.masked(),
        }
    }

    /// Convenience for a plain character chord, e.g. `Accelerator::key('K')`.
    pub fn key(c: char) -> Self {
        Self::new(KeyCode::Char(c), Mods::empty())
    }

    pub fn key_code(&self) -> Option<KeyCode> {
        self.key
    }

    pub fn mods(&self) -> Mods {
        self.mods
    }

    pub fn is_bound(&self) -> bool {
        self.key.is_some()
    }

    /// Parse canonical accelerator text. The empty string decodes to the
    /// unbound accelerator.
    pub fn parse(text: &str) -> Result<Self, AccelParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::UNBOUND);
        }

        let mut mods = Mods::empty();
        let mut key: Option<KeyCode> = None;

        for token in text.split('+').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_lowercase().as_str() {
                "shift" => mods |= Mods::SHIFT,
                "ctrl" | "control" => mods |= Mods::CONTROL,
                "alt" => mods |= Mods::ALT,
                _ => {
                    if key.is_some() {
                        return Err(AccelParseError::MultipleKeys(token.to_string()));
                    }
                    key = Some(parse_key(token)?);
                }
            }
        }

        match key {
            Some(key) => Ok(Self::new(key, mods)),
            None => Err(AccelParseError::MissingKey),
        }
    }
}

impl Default for Accelerator {
    fn default() -> Self {
        Self::UNBOUND
    }
}

impl fmt::Display for Accelerator {
    /// Inverse of `parse`: modifiers in fixed Shift, Ctrl, Alt order, then
    /// the key name. The unbound accelerator formats as the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self.key {
            Some(key) => key,
            None => return Ok(()),
        };
        if self.mods.contains(Mods::SHIFT) {
            f.write_str("Shift+")?;
        }
        if self.mods.contains(Mods::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.mods.contains(Mods::ALT) {
            f.write_str("Alt+")?;
        }
        match key {
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            named => f.write_str(named.name().unwrap_or("")),
        }
    }
}
