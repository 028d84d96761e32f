//! Error types for the docking window engine.

use horizon_dock_core::CoreError;

use crate::keys::KeyParseError;

/// Result type alias for docking operations.
pub type Result<T> = std::result::Result<T, DockingError>;

/// Errors that can occur in the docking window engine.
///
/// Conditions that are merely "nothing to do" (a key chord with no enabled
/// action, showing an unknown provider) are not errors; they are reported
/// through return values instead.
#[derive(Debug, thiserror::Error)]
pub enum DockingError {
    /// A provider was added twice.
    #[error("Component provider '{name}' ({owner}) has already been added")]
    ProviderAlreadyAdded { owner: String, name: String },

    /// An operation named a provider that is not registered.
    #[error("Component provider '{name}' ({owner}) is not registered with this manager")]
    UnknownProvider { owner: String, name: String },

    /// An action was added to a key binding bucket for a different chord.
    #[error("Key bindings don't match for action '{action}': expected {expected}, found {actual}")]
    KeyBindingMismatch {
        action: String,
        expected: String,
        actual: String,
    },

    /// A multi-state action was asked to select a state it does not hold.
    #[error("Attempted to set state '{state}' which is not a state of action '{action}'")]
    UnknownActionState { action: String, state: String },

    /// A multi-state action was given an empty list of states.
    #[error("Action '{action}' must have at least one state")]
    NoActionStates { action: String },

    /// A preference was stored without a key.
    #[error("Preference state key must not be empty")]
    EmptyPreferenceKey,

    /// Persisted layout data is structurally wrong.
    #[error("Invalid window layout: {0}")]
    InvalidLayout(String),

    /// Persisted data could not be read or written as XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// A key chord could not be parsed.
    #[error("Invalid key binding '{text}': {source}")]
    KeyParse {
        text: String,
        #[source]
        source: KeyParseError,
    },

    /// Configuration could not be parsed.
    #[error("Invalid docking configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The manager has been disposed.
    #[error("The docking window manager has been disposed")]
    Disposed,

    /// The manager behind a handle is gone.
    #[error("The docking window manager is no longer running")]
    ManagerGone,

    /// Core runtime error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DockingError {
    /// Create a duplicate provider error.
    pub fn provider_already_added(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ProviderAlreadyAdded {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Create an unknown provider error.
    pub fn unknown_provider(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownProvider {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Create an invalid layout error.
    pub fn invalid_layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout(message.into())
    }

    /// Create an XML error.
    pub fn xml(message: impl std::fmt::Display) -> Self {
        Self::Xml(message.to_string())
    }

    /// Create a key parse error.
    pub fn key_parse(text: impl Into<String>, source: KeyParseError) -> Self {
        Self::KeyParse {
            text: text.into(),
            source,
        }
    }
}
