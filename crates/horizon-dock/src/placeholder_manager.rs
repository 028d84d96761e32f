//! The registry of active providers and their placeholders.

use std::collections::HashMap;

use horizon_dock_core::logging::targets;

use crate::error::{DockingError, Result};
use crate::placeholder::{Placeholder, PlaceholderId};
use crate::provider::{describe, ProviderKey, ProviderRef};
use crate::tree::WindowTree;

struct ActiveEntry {
    provider: ProviderRef,
    placeholder: PlaceholderId,
    order: u64,
}

/// Identity and visibility of a placeholder, captured before a restore
/// invalidates its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderInfo {
    pub owner: String,
    pub name: String,
    pub title: String,
    pub group: String,
    pub showing: bool,
}

impl PlaceholderInfo {
    pub fn of(placeholder: &Placeholder) -> Self {
        Self {
            owner: placeholder.owner().to_string(),
            name: placeholder.name().to_string(),
            title: placeholder.title().to_string(),
            group: placeholder.group().to_string(),
            showing: placeholder.is_showing(),
        }
    }
}

/// Maps each active provider to exactly one placeholder of a [`WindowTree`].
///
/// The manager does not own the tree; every operation that touches
/// placeholders takes it as an argument.
#[derive(Default)]
pub struct PlaceholderManager {
    active: HashMap<ProviderKey, ActiveEntry>,
    next_order: u64,
}

impl PlaceholderManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_if_already_added(&self, provider: &ProviderRef) -> Result<()> {
        if self.contains_provider(provider) {
            tracing::warn!(target: targets::MANAGER, provider = %describe(provider.as_ref()), "provider added twice");
            return Err(DockingError::provider_already_added(provider.owner(), provider.name()));
        }
        Ok(())
    }

    pub fn contains_provider(&self, provider: &ProviderRef) -> bool {
        self.active.contains_key(&ProviderKey::of(provider))
    }

    pub fn active_placeholder(&self, provider: &ProviderRef) -> Option<PlaceholderId> {
        self.active.get(&ProviderKey::of(provider)).map(|e| e.placeholder)
    }

    /// The active provider bound to `placeholder`.
    pub fn provider_of(&self, placeholder: PlaceholderId) -> Option<ProviderRef> {
        self.active
            .values()
            .find(|e| e.placeholder == placeholder)
            .map(|e| e.provider.clone())
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active providers and their placeholders, in the order they were added.
    pub fn active_providers_to_placeholders(&self) -> Vec<(ProviderRef, PlaceholderId)> {
        let mut entries: Vec<&ActiveEntry> = self.active.values().collect();
        entries.sort_by_key(|e| e.order);
        entries
            .into_iter()
            .map(|e| (e.provider.clone(), e.placeholder))
            .collect()
    }

    pub fn active_providers(&self) -> Vec<ProviderRef> {
        self.active_providers_to_placeholders()
            .into_iter()
            .map(|(provider, _)| provider)
            .collect()
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Bind `provider` to a placeholder, reusing a matching inert slot if
    /// the tree has one.
    pub fn create_or_recycle_placeholder(
        &mut self,
        tree: &mut WindowTree,
        provider: &ProviderRef,
    ) -> Result<PlaceholderId> {
        self.check_if_already_added(provider)?;
        let id = match find_inert_slot(tree, provider) {
            Some(id) => {
                if let Some(placeholder) = tree.placeholder_mut(id) {
                    placeholder.attach(provider.clone());
                    // The provider starts hidden; showing is decided by the caller.
                    placeholder.set_showing(false);
                }
                tracing::trace!(target: targets::MANAGER, provider = %describe(provider.as_ref()), "recycled placeholder");
                id
            }
            None => tree.insert_placeholder(Placeholder::for_provider(provider)),
        };
        self.activate(provider, id);
        Ok(id)
    }

    /// Re-attach `provider` after a restore.
    ///
    /// A restored slot with the provider's identity is claimed as-is,
    /// keeping its saved visibility. Without one, a fresh placeholder is
    /// shown at its default position if `old` was showing.
    pub fn replace_placeholder(
        &mut self,
        tree: &mut WindowTree,
        provider: &ProviderRef,
        old: &PlaceholderInfo,
    ) -> PlaceholderId {
        let id = match find_inert_slot(tree, provider) {
            Some(id) => {
                if let Some(placeholder) = tree.placeholder_mut(id) {
                    placeholder.attach(provider.clone());
                }
                id
            }
            None => {
                let id = tree.insert_placeholder(Placeholder::for_provider(provider));
                if old.showing {
                    if let Some(placeholder) = tree.placeholder_mut(id) {
                        placeholder.set_showing(true);
                    }
                    tree.add_default(id);
                }
                id
            }
        };
        self.activate(provider, id);
        id
    }

    /// Hide every restored slot that no provider claimed.
    pub fn reset_placeholders_without_providers(&self, tree: &mut WindowTree) -> usize {
        let inert: Vec<PlaceholderId> = tree
            .placeholders()
            .filter(|(_, p)| p.is_inert() && p.is_showing())
            .map(|(id, _)| id)
            .collect();
        for &id in &inert {
            if let Some(placeholder) = tree.placeholder_mut(id) {
                placeholder.set_showing(false);
            }
        }
        inert.len()
    }

    fn activate(&mut self, provider: &ProviderRef, placeholder: PlaceholderId) {
        let order = self.next_order;
        self.next_order += 1;
        self.active.insert(
            ProviderKey::of(provider),
            ActiveEntry {
                provider: provider.clone(),
                placeholder,
                order,
            },
        );
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Unbind `provider`, returning the placeholder it held.
    ///
    /// A transient provider's placeholder is deleted and its node pruned.
    /// Any other provider leaves a hidden inert slot in place so the layout
    /// is reused if it comes back.
    pub fn remove_component(&mut self, tree: &mut WindowTree, provider: &ProviderRef) -> Option<PlaceholderId> {
        let entry = self.active.remove(&ProviderKey::of(provider))?;
        let id = entry.placeholder;
        let installed = tree.placeholder(id).and_then(Placeholder::node).is_some();

        if provider.is_transient() || !installed {
            tree.delete_placeholder(id);
        } else if let Some(placeholder) = tree.placeholder_mut(id) {
            placeholder.detach();
            placeholder.set_showing(false);
        }
        tree.clear_last_focused(id);
        tracing::debug!(target: targets::MANAGER, provider = %describe(provider.as_ref()), "component removed");
        Some(id)
    }

    /// Remove every active provider owned by `owner`.
    pub fn remove_all(&mut self, tree: &mut WindowTree, owner: &str) -> Vec<(ProviderRef, PlaceholderId)> {
        let owned: Vec<ProviderRef> = self
            .active_providers()
            .into_iter()
            .filter(|p| p.owner() == owner)
            .collect();
        owned
            .into_iter()
            .filter_map(|provider| {
                let id = self.remove_component(tree, &provider)?;
                Some((provider, id))
            })
            .collect()
    }

    /// Forget every provider without touching any tree.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

/// An inert slot for the provider's identity, preferring an exact title match.
fn find_inert_slot(tree: &WindowTree, provider: &ProviderRef) -> Option<PlaceholderId> {
    let title = provider.title();
    let mut candidates = tree
        .placeholders()
        .filter(|(_, p)| p.is_inert() && p.matches(provider.owner(), provider.name()));
    let first = candidates.next()?;
    if first.1.title() == title {
        return Some(first.0);
    }
    Some(
        candidates
            .find(|(_, p)| p.title() == title)
            .map_or(first.0, |(id, _)| id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Size};
    use crate::provider::{ComponentProvider, WindowPosition};
    use std::sync::Arc;

    struct Named {
        name: &'static str,
        title: &'static str,
        transient: bool,
    }

    impl ComponentProvider for Named {
        fn name(&self) -> &str {
            self.name
        }
        fn owner(&self) -> &str {
            "TestPlugin"
        }
        fn title(&self) -> String {
            self.title.to_string()
        }
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn provider(name: &'static str, title: &'static str, transient: bool) -> ProviderRef {
        Arc::new(Named { name, title, transient })
    }

    fn tree() -> WindowTree {
        WindowTree::new("Tool", Rect::new(0, 0, 100, 100), Size::new(10, 10))
    }

    #[test]
    fn test_duplicate_add_fails() {
        let mut tree = tree();
        let mut manager = PlaceholderManager::new();
        let p = provider("Listing", "Listing", false);
        manager.create_or_recycle_placeholder(&mut tree, &p).unwrap();
        assert!(matches!(
            manager.create_or_recycle_placeholder(&mut tree, &p),
            Err(DockingError::ProviderAlreadyAdded { .. })
        ));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_removed_slot_is_recycled() {
        let mut tree = tree();
        let mut manager = PlaceholderManager::new();
        let first = provider("Listing", "Listing", false);
        let id = manager.create_or_recycle_placeholder(&mut tree, &first).unwrap();
        tree.placeholder_mut(id).unwrap().set_showing(true);
        tree.add(id, WindowPosition::Left);

        assert_eq!(manager.remove_component(&mut tree, &first), Some(id));
        assert!(!manager.contains_provider(&first));
        let slot = tree.placeholder(id).unwrap();
        assert!(slot.is_inert());
        assert!(!slot.is_showing());
        assert!(slot.node().is_some());

        let second = provider("Listing", "Listing", false);
        assert_eq!(manager.create_or_recycle_placeholder(&mut tree, &second).unwrap(), id);
    }

    #[test]
    fn test_transient_removal_prunes() {
        let mut tree = tree();
        let mut manager = PlaceholderManager::new();
        let p = provider("Search", "Search", true);
        let id = manager.create_or_recycle_placeholder(&mut tree, &p).unwrap();
        tree.add(id, WindowPosition::Bottom);

        manager.remove_component(&mut tree, &p);
        assert!(!tree.contains_placeholder(id));
        assert!(tree.window_child(crate::tree::WindowId::Main).is_none());
    }

    #[test]
    fn test_title_match_wins() {
        let mut tree = tree();
        let a = tree.insert_placeholder(Placeholder::inert("TestPlugin", "Bytes", "Bytes: a", "", true));
        let b = tree.insert_placeholder(Placeholder::inert("TestPlugin", "Bytes", "Bytes: b", "", true));
        let mut manager = PlaceholderManager::new();

        let p = provider("Bytes", "Bytes: b", false);
        assert_eq!(manager.create_or_recycle_placeholder(&mut tree, &p).unwrap(), b);
        let q = provider("Bytes", "Bytes: z", false);
        assert_eq!(manager.create_or_recycle_placeholder(&mut tree, &q).unwrap(), a);
    }

    #[test]
    fn test_replace_and_reset() {
        let mut tree = tree();
        let restored = tree.insert_placeholder(Placeholder::inert("TestPlugin", "Listing", "Listing", "", true));
        let orphan = tree.insert_placeholder(Placeholder::inert("TestPlugin", "Gone", "Gone", "", true));
        tree.add(restored, WindowPosition::Right);
        tree.add(orphan, WindowPosition::Left);
        let mut manager = PlaceholderManager::new();

        let listing = provider("Listing", "Listing", false);
        let old = PlaceholderInfo {
            owner: "TestPlugin".into(),
            name: "Listing".into(),
            title: "Listing".into(),
            group: String::new(),
            showing: false,
        };
        assert_eq!(manager.replace_placeholder(&mut tree, &listing, &old), restored);
        assert!(tree.placeholder(restored).unwrap().is_showing());

        let fresh = provider("Console", "Console", false);
        let old_console = PlaceholderInfo { name: "Console".into(), showing: true, ..old };
        let id = manager.replace_placeholder(&mut tree, &fresh, &old_console);
        assert!(tree.placeholder(id).unwrap().node().is_some());

        assert_eq!(manager.reset_placeholders_without_providers(&mut tree), 1);
        assert!(!tree.placeholder(orphan).unwrap().is_showing());
    }

    #[test]
    fn test_remove_all_by_owner() {
        let mut tree = tree();
        let mut manager = PlaceholderManager::new();
        for name in ["A", "B"] {
            let p: ProviderRef = Arc::new(Named { name, title: name, transient: false });
            manager.create_or_recycle_placeholder(&mut tree, &p).unwrap();
        }
        assert_eq!(manager.remove_all(&mut tree, "TestPlugin").len(), 2);
        assert!(manager.is_empty());
        assert_eq!(tree.placeholder_count(), 0);
    }
}
