//! Key chords.
//!
//! A [`KeyChord`] is one key plus the modifiers held with it ("Ctrl+Shift+X").
//! Chords are what actions bind to and what hosts report when a shortcut is
//! typed. They parse from and print to the usual human-readable form:
//!
//! ```
//! use horizon_dock::keys::{Key, KeyChord, KeyboardModifiers};
//!
//! let chord: KeyChord = "Ctrl+Shift+X".parse().unwrap();
//! assert_eq!(chord, KeyChord::new(Key::X, KeyboardModifiers::CTRL_SHIFT));
//! assert_eq!(chord.to_string(), "Ctrl+Shift+X");
//!
//! // Space separated text is accepted as well.
//! assert_eq!("ctrl shift X".parse::<KeyChord>().unwrap(), chord);
//! ```

use std::fmt;
use std::str::FromStr;

/// Keyboard key codes that can take part in a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Numbers (main keyboard)
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    // Navigation
    ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
    Home, End, PageUp, PageDown,

    // Editing
    Backspace, Delete, Insert, Enter, Tab, Space, Escape,

    // Punctuation and symbols
    Minus, Equal,
    BracketLeft, BracketRight, Backslash,
    Semicolon, Quote,
    Comma, Period, Slash,
    Grave,

    /// The platform context-menu key.
    ContextMenu,
}

/// Canonical display names. Parsing also accepts these, case-insensitively.
const KEY_NAMES: &[(Key, &str)] = &[
    (Key::A, "A"), (Key::B, "B"), (Key::C, "C"), (Key::D, "D"), (Key::E, "E"),
    (Key::F, "F"), (Key::G, "G"), (Key::H, "H"), (Key::I, "I"), (Key::J, "J"),
    (Key::K, "K"), (Key::L, "L"), (Key::M, "M"), (Key::N, "N"), (Key::O, "O"),
    (Key::P, "P"), (Key::Q, "Q"), (Key::R, "R"), (Key::S, "S"), (Key::T, "T"),
    (Key::U, "U"), (Key::V, "V"), (Key::W, "W"), (Key::X, "X"), (Key::Y, "Y"),
    (Key::Z, "Z"),
    (Key::Digit0, "0"), (Key::Digit1, "1"), (Key::Digit2, "2"), (Key::Digit3, "3"),
    (Key::Digit4, "4"), (Key::Digit5, "5"), (Key::Digit6, "6"), (Key::Digit7, "7"),
    (Key::Digit8, "8"), (Key::Digit9, "9"),
    (Key::F1, "F1"), (Key::F2, "F2"), (Key::F3, "F3"), (Key::F4, "F4"),
    (Key::F5, "F5"), (Key::F6, "F6"), (Key::F7, "F7"), (Key::F8, "F8"),
    (Key::F9, "F9"), (Key::F10, "F10"), (Key::F11, "F11"), (Key::F12, "F12"),
    (Key::ArrowUp, "Up"), (Key::ArrowDown, "Down"),
    (Key::ArrowLeft, "Left"), (Key::ArrowRight, "Right"),
    (Key::Home, "Home"), (Key::End, "End"),
    (Key::PageUp, "PageUp"), (Key::PageDown, "PageDown"),
    (Key::Backspace, "Backspace"), (Key::Delete, "Delete"), (Key::Insert, "Insert"),
    (Key::Enter, "Enter"), (Key::Tab, "Tab"), (Key::Space, "Space"),
    (Key::Escape, "Escape"),
    (Key::Minus, "-"), (Key::Equal, "="),
    (Key::BracketLeft, "["), (Key::BracketRight, "]"), (Key::Backslash, "\\"),
    (Key::Semicolon, ";"), (Key::Quote, "'"),
    (Key::Comma, ","), (Key::Period, "."), (Key::Slash, "/"),
    (Key::Grave, "`"),
    (Key::ContextMenu, "ContextMenu"),
];

/// Alternative spellings accepted by the parser.
const KEY_ALIASES: &[(&str, Key)] = &[
    ("arrowup", Key::ArrowUp),
    ("arrowdown", Key::ArrowDown),
    ("arrowleft", Key::ArrowLeft),
    ("arrowright", Key::ArrowRight),
    ("pgup", Key::PageUp),
    ("page_up", Key::PageUp),
    ("pgdn", Key::PageDown),
    ("page_down", Key::PageDown),
    ("back", Key::Backspace),
    ("back_space", Key::Backspace),
    ("del", Key::Delete),
    ("ins", Key::Insert),
    ("return", Key::Enter),
    ("spacebar", Key::Space),
    ("esc", Key::Escape),
    ("minus", Key::Minus),
    ("equal", Key::Equal),
    ("equals", Key::Equal),
    ("bracketleft", Key::BracketLeft),
    ("open_bracket", Key::BracketLeft),
    ("bracketright", Key::BracketRight),
    ("close_bracket", Key::BracketRight),
    ("backslash", Key::Backslash),
    ("back_slash", Key::Backslash),
    ("semicolon", Key::Semicolon),
    ("quote", Key::Quote),
    ("comma", Key::Comma),
    ("period", Key::Period),
    ("slash", Key::Slash),
    ("grave", Key::Grave),
    ("back_quote", Key::Grave),
    ("context_menu", Key::ContextMenu),
    ("menu", Key::ContextMenu),
];

impl Key {
    /// The canonical display name of this key.
    pub fn name(self) -> &'static str {
        KEY_NAMES
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }

    /// Look a key up by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Key> {
        KEY_NAMES
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(key, _)| *key)
            .or_else(|| {
                KEY_ALIASES
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                    .map(|(_, key)| *key)
            })
    }

    /// Check if this is a function key.
    pub fn is_function_key(self) -> bool {
        matches!(
            self,
            Key::F1
                | Key::F2
                | Key::F3
                | Key::F4
                | Key::F5
                | Key::F6
                | Key::F7
                | Key::F8
                | Key::F9
                | Key::F10
                | Key::F11
                | Key::F12
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyboardModifiers {
    /// Shift key is pressed.
    pub shift: bool,
    /// Control key is pressed.
    pub control: bool,
    /// Alt/Option key is pressed.
    pub alt: bool,
    /// Meta/Command/Windows key is pressed.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Only Shift pressed.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Only Control pressed.
    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Only Alt pressed.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Only Meta pressed.
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Control and Shift pressed.
    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        control: true,
        ..Self::NONE
    };

    /// Whether no modifier is pressed.
    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

/// A single key with the modifiers held while pressing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyChord {
    /// The primary key.
    pub key: Key,
    /// The modifier keys that must be held.
    pub modifiers: KeyboardModifiers,
}

impl KeyChord {
    /// Create a new chord from a key and modifiers.
    pub fn new(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self { key, modifiers }
    }

    /// A chord with no modifiers.
    pub fn key_only(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::NONE)
    }

    /// A Ctrl+key chord.
    pub fn ctrl(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::CTRL)
    }

    /// An Alt+key chord.
    pub fn alt(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::ALT)
    }

    /// A Ctrl+Shift+key chord.
    pub fn ctrl_shift(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::CTRL_SHIFT)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(5);
        if self.modifiers.control {
            parts.push("Ctrl");
        }
        if self.modifiers.alt {
            parts.push("Alt");
        }
        if self.modifiers.shift {
            parts.push("Shift");
        }
        if self.modifiers.meta {
            parts.push("Meta");
        }
        parts.push(self.key.name());
        write!(f, "{}", parts.join("+"))
    }
}

/// Error type for parsing key chords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// The string is empty.
    Empty,
    /// No key was specified (only modifiers).
    NoKey,
    /// Unknown key name.
    UnknownKey(String),
    /// More than one non-modifier key.
    MultipleKeys,
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty key chord"),
            Self::NoKey => write!(f, "no key specified (only modifiers)"),
            Self::UnknownKey(s) => write!(f, "unknown key: {s}"),
            Self::MultipleKeys => write!(f, "a chord holds exactly one non-modifier key"),
        }
    }
}

impl std::error::Error for KeyParseError {}

impl FromStr for KeyChord {
    type Err = KeyParseError;

    /// Parse a chord such as `"Ctrl+Shift+X"` or `"ctrl shift X"`.
    ///
    /// Modifiers are `Ctrl`/`Control`, `Alt`/`Option`, `Shift` and
    /// `Meta`/`Cmd`/`Command`/`Win`/`Super`, in any order and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }

        // A lone "+" or " " would be split away; the symbol keys that collide
        // with separators are spelled out ("minus", "space") instead.
        let mut modifiers = KeyboardModifiers::NONE;
        let mut key = None;
        for part in s.split(|c: char| c == '+' || c.is_whitespace()) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.control = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "command" | "win" | "windows" | "super" => modifiers.meta = true,
                _ => {
                    let parsed =
                        Key::from_name(part).ok_or_else(|| KeyParseError::UnknownKey(part.to_string()))?;
                    if key.replace(parsed).is_some() {
                        return Err(KeyParseError::MultipleKeys);
                    }
                }
            }
        }

        key.map(|key| KeyChord::new(key, modifiers))
            .ok_or(KeyParseError::NoKey)
    }
}
