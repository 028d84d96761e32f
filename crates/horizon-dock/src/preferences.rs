//! Opaque preference state saved alongside the layout.
//!
//! ```text
//! PREFERENCES
//!   PREFERENCE_STATE NAME="key"
//!     STATE NAME="..." TYPE="boolean|long|double|string" VALUE="..."
//! ```

use std::collections::BTreeMap;
use std::fmt;

use horizon_dock_core::logging::targets;

use crate::error::{DockingError, Result};
use crate::xml::XmlElement;

pub(crate) const PREFERENCES: &str = "PREFERENCES";
const PREFERENCE_STATE: &str = "PREFERENCE_STATE";
const STATE: &str = "STATE";

/// A typed preference value.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PreferenceValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "long",
            Self::Float(_) => "double",
            Self::String(_) => "string",
        }
    }

    fn parse(type_name: &str, value: &str) -> Option<Self> {
        match type_name {
            "boolean" => value.parse().ok().map(Self::Bool),
            "int" | "long" => value.parse().ok().map(Self::Int),
            "float" | "double" => value.parse().ok().map(Self::Float),
            "string" => Some(Self::String(value.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// A bag of named, typed values.
///
/// The engine stores these for the application and never looks inside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferenceState {
    values: BTreeMap<String, PreferenceValue>,
}

impl PreferenceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, name: impl Into<String>, value: PreferenceValue) {
        self.values.insert(name.into(), value);
    }

    pub fn put_bool(&mut self, name: impl Into<String>, value: bool) {
        self.put(name, PreferenceValue::Bool(value));
    }

    pub fn put_int(&mut self, name: impl Into<String>, value: i64) {
        self.put(name, PreferenceValue::Int(value));
    }

    pub fn put_float(&mut self, name: impl Into<String>, value: f64) {
        self.put(name, PreferenceValue::Float(value));
    }

    pub fn put_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.put(name, PreferenceValue::String(value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&PreferenceValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            Some(PreferenceValue::Bool(v)) => *v,
            _ => default,
        }
    }

    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        match self.get(name) {
            Some(PreferenceValue::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn get_float(&self, name: &str, default: f64) -> f64 {
        match self.get(name) {
            Some(PreferenceValue::Float(v)) => *v,
            Some(PreferenceValue::Int(v)) => *v as f64,
            _ => default,
        }
    }

    pub fn get_string<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.get(name) {
            Some(PreferenceValue::String(v)) => v,
            _ => default,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PreferenceValue> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn to_xml(&self, key: &str) -> XmlElement {
        let mut element = XmlElement::new(PREFERENCE_STATE).with_attribute("NAME", key);
        for (name, value) in &self.values {
            element.add_child(
                XmlElement::new(STATE)
                    .with_attribute("NAME", name)
                    .with_attribute("TYPE", value.type_name())
                    .with_attribute("VALUE", value),
            );
        }
        element
    }

    fn from_xml(element: &XmlElement) -> Self {
        let mut state = Self::new();
        for entry in element.children_by_name(STATE) {
            let (Some(name), Some(type_name), Some(value)) =
                (entry.attribute("NAME"), entry.attribute("TYPE"), entry.attribute("VALUE"))
            else {
                continue;
            };
            match PreferenceValue::parse(type_name, value) {
                Some(value) => state.put(name, value),
                None => tracing::warn!(
                    target: targets::PERSIST,
                    name,
                    type_name,
                    "skipping unreadable preference value"
                ),
            }
        }
        state
    }
}

/// Preference states by key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferenceStore {
    states: BTreeMap<String, PreferenceState>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, state: PreferenceState) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            tracing::warn!(target: targets::PERSIST, "preference state stored without a key");
            return Err(DockingError::EmptyPreferenceKey);
        }
        self.states.insert(key, state);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&PreferenceState> {
        self.states.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PreferenceState> {
        self.states.remove(key)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The `PREFERENCES` element.
    pub fn to_xml(&self) -> XmlElement {
        let mut element = XmlElement::new(PREFERENCES);
        for (key, state) in &self.states {
            element.add_child(state.to_xml(key));
        }
        element
    }

    /// Merge the states of a `PREFERENCES` element into this store.
    pub fn restore_from_xml(&mut self, element: &XmlElement) {
        for child in element.children_by_name(PREFERENCE_STATE) {
            match child.attribute("NAME").filter(|key| !key.is_empty()) {
                Some(key) => {
                    self.states.insert(key.to_string(), PreferenceState::from_xml(child));
                }
                None => tracing::warn!(target: targets::PERSIST, "skipping preference state without a name"),
            }
        }
    }
}
