//! Tool and local action bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;

use horizon_dock_core::logging::targets;
use horizon_dock_core::ConnectionId;

use super::{same_action, ActionKey, ActionPropertyChange, ActionRef, KeyBindingRegistry};
use crate::error::Result;
use crate::provider::{ProviderKey, ProviderRef};

struct LocalActions {
    provider: ProviderRef,
    actions: Vec<ActionRef>,
}

/// Owns the tool's actions and keeps the key binding registry in step with
/// them.
///
/// Tool actions apply tool-wide. Local actions belong to one provider and
/// only win a key chord while that provider is focused. When an action's
/// key binding changes, it is moved to its new chord automatically.
pub struct ActionManager {
    tool_actions: Vec<ActionRef>,
    local_actions: HashMap<ProviderKey, LocalActions>,
    key_bindings: Arc<KeyBindingRegistry>,
    connections: HashMap<ActionKey, ConnectionId>,
}

impl Default for ActionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionManager {
    pub fn new() -> Self {
        Self {
            tool_actions: Vec::new(),
            local_actions: HashMap::new(),
            key_bindings: Arc::new(KeyBindingRegistry::new()),
            connections: HashMap::new(),
        }
    }

    pub fn key_bindings(&self) -> &Arc<KeyBindingRegistry> {
        &self.key_bindings
    }

    // ========================================================================
    // Tool actions
    // ========================================================================

    /// Add a tool-wide action. Adding an action twice does nothing.
    pub fn add_tool_action(&mut self, action: ActionRef) -> Result<()> {
        if self.tool_actions.iter().any(|a| same_action(a, &action)) {
            return Ok(());
        }
        self.key_bindings.register(&action, None)?;
        self.track(&action, None);
        tracing::debug!(target: targets::ACTIONS, action = %action.full_name(), "tool action added");
        self.tool_actions.push(action);
        Ok(())
    }

    pub fn remove_tool_action(&mut self, action: &ActionRef) -> bool {
        let before = self.tool_actions.len();
        self.tool_actions.retain(|a| !same_action(a, action));
        if before == self.tool_actions.len() {
            return false;
        }
        self.forget(action);
        true
    }

    /// Remove every tool action with the given owner.
    pub fn remove_tool_actions_for_owner(&mut self, owner: &str) -> Vec<ActionRef> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tool_actions)
            .into_iter()
            .partition(|a| a.owner() == owner);
        self.tool_actions = kept;
        self.key_bindings
            .remove_where(|action, provider| provider.is_none() && action.owner() == owner);
        for action in &removed {
            self.untrack(action);
        }
        removed
    }

    pub fn tool_actions(&self) -> &[ActionRef] {
        &self.tool_actions
    }

    // ========================================================================
    // Local actions
    // ========================================================================

    /// Add an action scoped to `provider`. Adding an action twice does nothing.
    pub fn add_local_action(&mut self, provider: &ProviderRef, action: ActionRef) -> Result<()> {
        let key = ProviderKey::of(provider);
        let present = self
            .local_actions
            .get(&key)
            .is_some_and(|entry| entry.actions.iter().any(|a| same_action(a, &action)));
        if present {
            return Ok(());
        }
        self.key_bindings.register(&action, Some(provider))?;
        self.local_actions
            .entry(key)
            .or_insert_with(|| LocalActions {
                provider: provider.clone(),
                actions: Vec::new(),
            })
            .actions
            .push(action.clone());
        self.track(&action, Some(provider));
        tracing::debug!(
            target: targets::ACTIONS,
            action = %action.full_name(),
            provider = provider.name(),
            "local action added"
        );
        Ok(())
    }

    pub fn remove_local_action(&mut self, provider: &ProviderRef, action: &ActionRef) -> bool {
        let key = ProviderKey::of(provider);
        let Some(entry) = self.local_actions.get_mut(&key) else {
            return false;
        };
        let before = entry.actions.len();
        entry.actions.retain(|a| !same_action(a, action));
        let removed = before != entry.actions.len();
        if entry.actions.is_empty() {
            self.local_actions.remove(&key);
        }
        if removed {
            self.forget(action);
        }
        removed
    }

    /// Remove every local action of `provider`.
    pub fn remove_provider_actions(&mut self, provider: &ProviderRef) -> Vec<ActionRef> {
        let Some(entry) = self.local_actions.remove(&ProviderKey::of(provider)) else {
            return Vec::new();
        };
        for action in &entry.actions {
            self.forget(action);
        }
        entry.actions
    }

    /// Remove every local action owned by `owner`, whichever provider holds it.
    pub fn remove_local_actions_for_owner(&mut self, owner: &str) -> Vec<ActionRef> {
        let mut removed = Vec::new();
        for entry in self.local_actions.values_mut() {
            let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut entry.actions)
                .into_iter()
                .partition(|a| a.owner() == owner || entry.provider.owner() == owner);
            entry.actions = kept;
            removed.extend(gone);
        }
        self.local_actions.retain(|_, entry| !entry.actions.is_empty());
        self.key_bindings.remove_where(|action, provider| {
            provider.is_some_and(|p| action.owner() == owner || p.owner() == owner)
        });
        for action in &removed {
            self.untrack(action);
        }
        removed
    }

    pub fn local_actions(&self, provider: &ProviderRef) -> Vec<ActionRef> {
        self.local_actions
            .get(&ProviderKey::of(provider))
            .map(|entry| entry.actions.clone())
            .unwrap_or_default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every tool and local action.
    pub fn all_actions(&self) -> Vec<ActionRef> {
        let mut all = self.tool_actions.clone();
        for entry in self.local_actions.values() {
            all.extend(entry.actions.iter().cloned());
        }
        all
    }

    /// Actions whose full name (`"name (owner)"`) equals `full_name`.
    pub fn actions_by_full_name(&self, full_name: &str) -> Vec<ActionRef> {
        self.all_actions()
            .into_iter()
            .filter(|a| a.full_name() == full_name)
            .collect()
    }

    /// Drop every action and binding.
    pub fn dispose(&mut self) {
        for action in self.all_actions() {
            self.forget(&action);
        }
        self.tool_actions.clear();
        self.local_actions.clear();
        self.key_bindings.clear();
    }

    // ========================================================================
    // Key binding tracking
    // ========================================================================

    fn track(&mut self, action: &ActionRef, provider: Option<&ProviderRef>) {
        let key = ActionKey::of(action);
        if self.connections.contains_key(&key) {
            return;
        }
        let registry = Arc::downgrade(&self.key_bindings);
        let weak_action = Arc::downgrade(action);
        let provider = provider.cloned();
        let id = action.property_changed().connect(move |change| {
            let ActionPropertyChange::KeyBinding { old, new } = change else {
                return;
            };
            let old_chord = old.map(|data| data.chord());
            let new_chord = new.map(|data| data.chord());
            if old_chord == new_chord {
                return;
            }
            let (Some(registry), Some(action)) = (registry.upgrade(), weak_action.upgrade()) else {
                return;
            };
            if let Some(chord) = old_chord {
                registry.unregister(&action, chord);
            }
            if let Err(err) = registry.register(&action, provider.as_ref()) {
                tracing::warn!(target: targets::KEYS, error = %err, "failed to rebind action");
            }
        });
        self.connections.insert(key, id);
    }

    fn forget(&mut self, action: &ActionRef) {
        if let Some(chord) = action.key_binding() {
            self.key_bindings.unregister(action, chord);
        }
        self.untrack(action);
    }

    /// Stop following key binding changes of `action`.
    fn untrack(&mut self, action: &ActionRef) {
        if let Some(id) = self.connections.remove(&ActionKey::of(action)) {
            action.property_changed().disconnect(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DockingAction, DockingActionIf, KeyBindingData};
    use crate::keys::{Key, KeyChord};
    use crate::provider::ComponentProvider;

    struct Console;

    impl ComponentProvider for Console {
        fn name(&self) -> &str {
            "Console"
        }
        fn owner(&self) -> &str {
            "ConsolePlugin"
        }
        fn title(&self) -> String {
            "Console".to_string()
        }
    }

    fn bound(name: &str, owner: &str, chord: KeyChord) -> ActionRef {
        Arc::new(DockingAction::new(name, owner).with_key_binding(KeyBindingData::new(chord)))
    }

    #[test]
    fn test_tool_actions_register_bindings() {
        let mut manager = ActionManager::new();
        let action = bound("Save", "ProjectPlugin", KeyChord::ctrl(Key::S));
        manager.add_tool_action(action.clone()).unwrap();
        manager.add_tool_action(action.clone()).unwrap();

        assert_eq!(manager.tool_actions().len(), 1);
        assert!(manager.key_bindings().bucket(KeyChord::ctrl(Key::S)).is_some());

        assert!(manager.remove_tool_action(&action));
        assert!(manager.key_bindings().is_empty());
        assert_eq!(action.property_changed().connection_count(), 0);
    }

    #[test]
    fn test_rebinds_on_key_binding_change() {
        let mut manager = ActionManager::new();
        let action = bound("Save", "ProjectPlugin", KeyChord::ctrl(Key::S));
        manager.add_tool_action(action.clone()).unwrap();

        action.set_key_binding_data(Some(KeyBindingData::new(KeyChord::ctrl(Key::W))));
        assert!(manager.key_bindings().bucket(KeyChord::ctrl(Key::S)).is_none());
        assert!(manager.key_bindings().bucket(KeyChord::ctrl(Key::W)).is_some());

        action.set_key_binding_data(None);
        assert!(manager.key_bindings().is_empty());
    }

    #[test]
    fn test_local_actions() {
        let mut manager = ActionManager::new();
        let console: ProviderRef = Arc::new(Console);
        let clear = bound("Clear", "ConsolePlugin", KeyChord::ctrl(Key::L));
        manager.add_local_action(&console, clear.clone()).unwrap();

        assert_eq!(manager.local_actions(&console).len(), 1);
        assert_eq!(manager.actions_by_full_name("Clear (ConsolePlugin)").len(), 1);

        let removed = manager.remove_provider_actions(&console);
        assert_eq!(removed.len(), 1);
        assert!(manager.local_actions(&console).is_empty());
        assert!(manager.key_bindings().is_empty());
    }

    #[test]
    fn test_remove_for_owner() {
        let mut manager = ActionManager::new();
        let console: ProviderRef = Arc::new(Console);
        manager
            .add_tool_action(bound("Open", "ConsolePlugin", KeyChord::ctrl(Key::O)))
            .unwrap();
        manager
            .add_tool_action(bound("Save", "ProjectPlugin", KeyChord::ctrl(Key::S)))
            .unwrap();
        manager
            .add_local_action(&console, bound("Clear", "Other", KeyChord::ctrl(Key::L)))
            .unwrap();

        assert_eq!(manager.remove_tool_actions_for_owner("ConsolePlugin").len(), 1);
        assert_eq!(manager.remove_local_actions_for_owner("ConsolePlugin").len(), 1);
        assert_eq!(manager.all_actions().len(), 1);
        assert_eq!(manager.key_bindings().chords(), vec![KeyChord::ctrl(Key::S)]);
    }

    #[test]
    fn test_remove_for_owner_keeps_shared_chord() {
        let mut manager = ActionManager::new();
        let console: ProviderRef = Arc::new(Console);
        let chord = KeyChord::ctrl(Key::K);
        let clear = bound("Clear", "ConsolePlugin", chord);
        let kill = bound("Kill", "ConsolePlugin", chord);
        let keep = bound("Keep", "ProjectPlugin", chord);
        manager.add_tool_action(kill.clone()).unwrap();
        manager.add_tool_action(keep.clone()).unwrap();
        manager.add_local_action(&console, clear.clone()).unwrap();

        assert_eq!(manager.remove_tool_actions_for_owner("ConsolePlugin").len(), 1);
        let bucket = manager.key_bindings().bucket(chord).unwrap();
        assert_eq!(bucket.len(), 2);

        assert_eq!(manager.remove_local_actions_for_owner("ConsolePlugin").len(), 1);
        let remaining = manager.key_bindings().bucket(chord).unwrap().actions();
        assert_eq!(remaining.len(), 1);
        assert!(same_action(&remaining[0], &keep));
        assert_eq!(kill.property_changed().connection_count(), 0);
        assert_eq!(clear.property_changed().connection_count(), 0);

        // Removed actions no longer follow rebinds into the registry.
        clear.set_key_binding_data(Some(KeyBindingData::new(KeyChord::ctrl(Key::J))));
        assert!(manager.key_bindings().bucket(KeyChord::ctrl(Key::J)).is_none());
    }

    #[test]
    fn test_dispose_clears_everything() {
        let mut manager = ActionManager::new();
        let action = bound("Save", "ProjectPlugin", KeyChord::ctrl(Key::S));
        manager.add_tool_action(action.clone()).unwrap();
        manager.dispose();
        assert!(manager.all_actions().is_empty());
        assert!(manager.key_bindings().is_empty());
        assert_eq!(action.property_changed().connection_count(), 0);
    }
}
