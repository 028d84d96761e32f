//! Presentation data attached to actions.

use std::fmt;

use crate::error::{DockingError, Result};
use crate::keys::KeyChord;

// ============================================================================
// Menu Data
// ============================================================================

/// Where an action appears in a menu bar or popup menu.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MenuData {
    path: Vec<String>,
    icon: Option<String>,
    group: Option<String>,
    sub_group: Option<String>,
    mnemonic: Option<char>,
}

impl MenuData {
    /// Menu data for the given path. The last element is the item's label.
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            icon: None,
            group: None,
            sub_group: None,
            mnemonic: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_sub_group(mut self, sub_group: impl Into<String>) -> Self {
        self.sub_group = Some(sub_group.into());
        self
    }

    pub fn with_mnemonic(mut self, mnemonic: char) -> Self {
        self.mnemonic = Some(mnemonic);
        self
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The item's label: the last path element.
    pub fn item_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    /// The path joined with `/`.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn sub_group(&self) -> Option<&str> {
        self.sub_group.as_deref()
    }

    pub fn mnemonic(&self) -> Option<char> {
        self.mnemonic
    }
}

// ============================================================================
// Tool Bar Data
// ============================================================================

/// Where an action appears on a toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ToolBarData {
    icon: Option<String>,
    group: Option<String>,
    sub_group: Option<String>,
}

impl ToolBarData {
    pub fn new(icon: impl Into<String>) -> Self {
        Self {
            icon: Some(icon.into()),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_sub_group(mut self, sub_group: impl Into<String>) -> Self {
        self.sub_group = Some(sub_group.into());
        self
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn set_group(&mut self, group: Option<String>) {
        self.group = group;
    }

    pub fn sub_group(&self) -> Option<&str> {
        self.sub_group.as_deref()
    }

    pub fn set_sub_group(&mut self, sub_group: Option<String>) {
        self.sub_group = sub_group;
    }
}

// ============================================================================
// Key Binding Data
// ============================================================================

/// How strongly a key binding claims its chord.
///
/// Variants are ordered from strongest to weakest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyBindingPrecedence {
    /// Reserved bindings fire even while a menu is open.
    Reserved,
    /// Handled by a focused component's key listener.
    KeyListener,
    /// Handled through the focused component's action map.
    ActionMap,
    #[default]
    Default,
}

impl fmt::Display for KeyBindingPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reserved => "Reserved",
            Self::KeyListener => "KeyListener",
            Self::ActionMap => "ActionMap",
            Self::Default => "Default",
        };
        f.write_str(name)
    }
}

/// A key chord bound to an action, with its precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBindingData {
    chord: KeyChord,
    precedence: KeyBindingPrecedence,
}

impl KeyBindingData {
    pub fn new(chord: KeyChord) -> Self {
        Self {
            chord,
            precedence: KeyBindingPrecedence::Default,
        }
    }

    /// A binding that fires even while a menu is open.
    pub fn reserved(chord: KeyChord) -> Self {
        Self {
            chord,
            precedence: KeyBindingPrecedence::Reserved,
        }
    }

    /// Parse a binding such as `"Ctrl+Shift+X"`.
    pub fn parse(text: &str) -> Result<Self> {
        let chord = text
            .parse::<KeyChord>()
            .map_err(|e| DockingError::key_parse(text, e))?;
        Ok(Self::new(chord))
    }

    pub fn with_precedence(mut self, precedence: KeyBindingPrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn chord(&self) -> KeyChord {
        self.chord
    }

    pub fn precedence(&self) -> KeyBindingPrecedence {
        self.precedence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;

    #[test]
    fn test_menu_data_paths() {
        let data = MenuData::new(["Window", "Debugger", "Registers"]).with_group("Core");
        assert_eq!(data.item_name(), "Registers");
        assert_eq!(data.path_string(), "Window/Debugger/Registers");
        assert_eq!(data.group(), Some("Core"));
        assert_eq!(MenuData::new(Vec::<String>::new()).item_name(), "");
    }

    #[test]
    fn test_key_binding_parse() {
        let data = KeyBindingData::parse("Ctrl+Shift+X").unwrap();
        assert_eq!(data.chord(), KeyChord::ctrl_shift(Key::X));
        assert_eq!(data.precedence(), KeyBindingPrecedence::Default);

        let err = KeyBindingData::parse("Ctrl+Nope").unwrap_err();
        assert!(matches!(err, DockingError::KeyParse { .. }));
    }

    #[test]
    fn test_precedence_order() {
        assert!(KeyBindingPrecedence::Reserved < KeyBindingPrecedence::Default);
        assert_eq!(
            KeyBindingData::reserved(KeyChord::key_only(Key::F1)).precedence(),
            KeyBindingPrecedence::Reserved
        );
    }
}
