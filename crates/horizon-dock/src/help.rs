//! Help locations and the help service seam.
//!
//! The docking engine never renders help. It only records where help for a
//! provider or action lives, so that a host's help viewer can find it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use parking_lot::RwLock;

/// A pointer into the help system: a topic and an optional anchor in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HelpLocation {
    topic: String,
    anchor: Option<String>,
}

impl HelpLocation {
    /// Create a help location.
    pub fn new(topic: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            anchor: Some(anchor.into()),
        }
    }

    /// A help location for a whole topic.
    pub fn topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            anchor: None,
        }
    }

    pub fn topic_name(&self) -> &str {
        &self.topic
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }
}

impl fmt::Display for HelpLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.anchor {
            Some(anchor) => write!(f, "{}#{}", self.topic, anchor),
            None => f.write_str(&self.topic),
        }
    }
}

/// Something help can be registered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HelpTarget {
    /// A component provider, by owner and name.
    Provider { owner: String, name: String },
    /// An action, by full name (`"name (owner)"`).
    Action(String),
}

impl HelpTarget {
    pub fn provider(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Provider {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn action(full_name: impl Into<String>) -> Self {
        Self::Action(full_name.into())
    }
}

/// Registry of help locations, implemented by the host application.
pub trait HelpService: Send + Sync {
    /// Record where help for `target` lives.
    fn register_help(&self, target: HelpTarget, location: HelpLocation);

    /// Forget the help registered for `target`.
    fn clear_help(&self, target: &HelpTarget);

    /// Where help for `target` lives, if registered.
    fn help_location(&self, target: &HelpTarget) -> Option<HelpLocation>;

    /// Mark `target` as intentionally having no help.
    fn exclude_from_help(&self, target: HelpTarget);

    /// Whether `target` was marked as having no help.
    fn is_excluded_from_help(&self, target: &HelpTarget) -> bool;
}

/// An in-memory [`HelpService`].
#[derive(Debug, Default)]
pub struct DefaultHelpService {
    locations: RwLock<HashMap<HelpTarget, HelpLocation>>,
    excluded: RwLock<HashSet<HelpTarget>>,
}

impl DefaultHelpService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered locations.
    pub fn len(&self) -> usize {
        self.locations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.read().is_empty()
    }
}

impl HelpService for DefaultHelpService {
    fn register_help(&self, target: HelpTarget, location: HelpLocation) {
        self.excluded.write().remove(&target);
        self.locations.write().insert(target, location);
    }

    fn clear_help(&self, target: &HelpTarget) {
        self.locations.write().remove(target);
    }

    fn help_location(&self, target: &HelpTarget) -> Option<HelpLocation> {
        self.locations.read().get(target).cloned()
    }

    fn exclude_from_help(&self, target: HelpTarget) {
        self.locations.write().remove(&target);
        self.excluded.write().insert(target);
    }

    fn is_excluded_from_help(&self, target: &HelpTarget) -> bool {
        self.excluded.read().contains(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let service = DefaultHelpService::new();
        let target = HelpTarget::provider("CodeBrowserPlugin", "Listing");
        assert!(service.help_location(&target).is_none());

        service.register_help(target.clone(), HelpLocation::new("CodeBrowserPlugin", "Listing"));
        assert_eq!(
            service.help_location(&target).map(|l| l.to_string()),
            Some("CodeBrowserPlugin#Listing".to_string())
        );
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn test_exclusion_replaces_location() {
        let service = DefaultHelpService::new();
        let target = HelpTarget::action("Copy (Clipboard)");
        service.register_help(target.clone(), HelpLocation::topic("Clipboard"));
        service.exclude_from_help(target.clone());

        assert!(service.is_excluded_from_help(&target));
        assert!(service.help_location(&target).is_none());

        service.register_help(target.clone(), HelpLocation::topic("Clipboard"));
        assert!(!service.is_excluded_from_help(&target));
    }
}
