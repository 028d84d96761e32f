//! Adding, showing, moving and removing components.

use horizon_dock_core::logging::targets;

use super::DockingWindowManager;
use crate::action::ActionRef;
use crate::error::{DockingError, Result};
use crate::focus::FocusOwner;
use crate::geometry::Point;
use crate::help::{HelpLocation, HelpTarget};
use crate::placeholder::{Placeholder, PlaceholderId};
use crate::provider::{describe, ProviderKey, ProviderRef, WindowPosition};

impl DockingWindowManager {
    // ========================================================================
    // Registration
    // ========================================================================

    /// Register `provider`, showing it if `show` is set.
    ///
    /// A provider that left a slot behind (from an earlier removal or a
    /// restored layout) gets that slot back.
    pub fn add_component(&mut self, provider: ProviderRef, show: bool) -> Result<()> {
        let Some(tree) = self.tree.as_mut() else {
            return Err(DockingError::Disposed);
        };
        self.placeholders.check_if_already_added(&provider)?;

        let target = HelpTarget::provider(provider.owner(), provider.name());
        if self.help.help_location(&target).is_none() {
            let location = provider
                .help_location()
                .unwrap_or_else(|| HelpLocation::new(provider.owner(), provider.name()));
            self.help.register_help(target, location);
        }

        let id = self.placeholders.create_or_recycle_placeholder(tree, &provider)?;
        tracing::debug!(target: targets::MANAGER, provider = %describe(provider.as_ref()), show, "component added");
        self.show_placeholder(id, show, true);
        self.schedule_update();
        Ok(())
    }

    /// Unregister `provider`. Returns `false` if it was not registered.
    pub fn remove_component(&mut self, provider: &ProviderRef) -> bool {
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        self.actions.remove_provider_actions(provider);
        let Some(id) = self.placeholders.remove_component(tree, provider) else {
            return false;
        };
        self.forget_placeholder(id);
        let key = ProviderKey::of(provider);
        self.name_cache.retain(|_, cached| ProviderKey::of(cached) != key);
        self.schedule_update();
        true
    }

    /// Unregister every provider and tool action belonging to `owner`.
    pub fn remove_all(&mut self, owner: &str) {
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        self.actions.remove_tool_actions_for_owner(owner);
        self.actions.remove_local_actions_for_owner(owner);
        let removed = self.placeholders.remove_all(tree, owner);
        for (provider, id) in removed {
            self.actions.remove_provider_actions(&provider);
            self.forget_placeholder(id);
        }
        self.name_cache.retain(|_, cached| cached.owner() != owner);
        tracing::debug!(target: targets::MANAGER, owner, "owner removed");
        self.schedule_update();
    }

    /// Drop focus state pointing at a placeholder that left the layout.
    fn forget_placeholder(&mut self, id: PlaceholderId) {
        if let Some(placeholder) = self.tree.as_mut().and_then(|t| t.placeholder_mut(id)) {
            placeholder.set_selected(false);
        }
        if self.focus_owner == FocusOwner::Component(id) {
            self.focus_owner = FocusOwner::None;
        }
        if self.focus.forget(id) {
            self.signals.focus_changed.emit(None);
        }
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Show or hide `provider`. Returns `false` if it is not registered.
    pub fn show_component(&mut self, provider: &ProviderRef, visible: bool) -> bool {
        match self.placeholders.active_placeholder(provider) {
            Some(id) => self.show_placeholder(id, visible, true),
            None => {
                if visible {
                    tracing::warn!(
                        target: targets::MANAGER,
                        provider = %describe(provider.as_ref()),
                        "attempted to show a provider that has not been added"
                    );
                }
                false
            }
        }
    }

    pub fn is_visible_component(&self, provider: &ProviderRef) -> bool {
        self.placeholders
            .active_placeholder(provider)
            .and_then(|id| self.placeholder(id))
            .is_some_and(|p| p.is_showing())
    }

    /// Show `provider` without taking focus and bring it to front.
    pub fn to_front(&mut self, provider: &ProviderRef) -> bool {
        let Some(id) = self.placeholders.active_placeholder(provider) else {
            return false;
        };
        if !self.placeholder(id).is_some_and(|p| p.is_showing()) {
            self.show_placeholder(id, true, false);
        }
        self.move_to_front(id, false);
        true
    }

    /// Show or hide a placeholder.
    ///
    /// Showing one that is already showing brings it to front and stages it
    /// for focus again. Returns `false` for an unknown or inert placeholder.
    #[tracing::instrument(skip(self), target = "horizon_dock::manager", level = "trace")]
    pub fn show_placeholder(&mut self, id: PlaceholderId, visible: bool, request_focus: bool) -> bool {
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        let Some(placeholder) = tree.placeholder_mut(id) else {
            return false;
        };
        if placeholder.is_inert() {
            return false;
        }

        if placeholder.is_showing() == visible {
            if visible {
                self.move_to_front(id, true);
                self.focus.stage(Some(id));
                self.schedule_update();
            }
            return true;
        }

        placeholder.set_showing(visible);
        let installed = placeholder.node().is_some();
        if visible {
            if !installed {
                tree.add_default(id);
            }
            self.move_to_front(id, false);
            if request_focus {
                self.focus.stage(Some(id));
            }
        } else {
            if let Some(placeholder) = tree.placeholder_mut(id) {
                placeholder.set_selected(false);
            }
            if self.focus.focused() == Some(id) {
                self.focus.set_focused(None);
                self.signals.focus_changed.emit(None);
            }
            if self.focus.next() == Some(id) {
                self.focus.stage(None);
            }
        }
        self.schedule_update();
        true
    }

    /// Select `id`'s tab and raise its window, tracking repeated requests.
    fn move_to_front(&mut self, id: PlaceholderId, emphasize: bool) {
        let now = self.now();
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        tree.bring_to_front(id);
        if let Some(window) = tree.window_of(id) {
            self.signals.window_to_front.emit(window);
        }
        if emphasize && self.activation.activated(id, now) {
            tracing::trace!(target: targets::FOCUS, placeholder = ?id, "emphasizing repeatedly activated component");
            self.signals.emphasize.emit(id);
        }
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Re-read `provider`'s title, sub-title and icon.
    pub fn update_title(&mut self, provider: &ProviderRef) -> bool {
        let updated = self.with_placeholder(provider, |p| p.refresh());
        if updated {
            self.schedule_update();
        }
        updated
    }

    /// Show or hide the header bar above `provider`'s component.
    pub fn show_component_header(&mut self, provider: &ProviderRef, shown: bool) -> bool {
        let updated = self.with_placeholder(provider, |p| p.set_header_shown(shown));
        if updated {
            self.schedule_update();
        }
        updated
    }

    /// Override the icon of `provider`'s tab.
    pub fn set_icon(&mut self, provider: &ProviderRef, icon: Option<String>) -> bool {
        let updated = self.with_placeholder(provider, |p| p.set_icon(icon));
        if updated {
            self.schedule_update();
        }
        updated
    }

    fn with_placeholder(&mut self, provider: &ProviderRef, f: impl FnOnce(&mut Placeholder)) -> bool {
        let Some(id) = self.placeholders.active_placeholder(provider) else {
            return false;
        };
        match self.tree.as_mut().and_then(|t| t.placeholder_mut(id)) {
            Some(placeholder) => {
                f(placeholder);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Add an action scoped to `provider`.
    pub fn add_local_action(&mut self, provider: &ProviderRef, action: ActionRef) -> Result<()> {
        if self.tree.is_none() {
            return Err(DockingError::Disposed);
        }
        if !self.placeholders.contains_provider(provider) {
            tracing::warn!(
                target: targets::ACTIONS,
                provider = %describe(provider.as_ref()),
                action = %action.full_name(),
                "local action added for an unknown provider"
            );
            return Err(DockingError::unknown_provider(provider.owner(), provider.name()));
        }
        self.actions.add_local_action(provider, action)?;
        self.schedule_update();
        Ok(())
    }

    pub fn remove_provider_action(&mut self, provider: &ProviderRef, action: &ActionRef) -> bool {
        let removed = self.actions.remove_local_action(provider, action);
        if removed {
            self.schedule_update();
        }
        removed
    }

    /// Add a tool-wide action.
    pub fn add_tool_action(&mut self, action: ActionRef) -> Result<()> {
        if self.tree.is_none() {
            return Err(DockingError::Disposed);
        }
        self.actions.add_tool_action(action)?;
        self.schedule_update();
        Ok(())
    }

    pub fn remove_tool_action(&mut self, action: &ActionRef) -> bool {
        let removed = self.actions.remove_tool_action(action);
        if removed {
            self.schedule_update();
        }
        removed
    }

    pub fn local_actions(&self, provider: &ProviderRef) -> Vec<ActionRef> {
        self.actions.local_actions(provider)
    }

    pub fn tool_actions(&self) -> Vec<ActionRef> {
        self.actions.tool_actions().to_vec()
    }

    /// Every action, tool-wide and local.
    pub fn all_actions(&self) -> Vec<ActionRef> {
        self.actions.all_actions()
    }

    pub fn actions_by_full_name(&self, full_name: &str) -> Vec<ActionRef> {
        self.actions.actions_by_full_name(full_name)
    }

    // ========================================================================
    // Moving
    // ========================================================================

    /// Dock `source` relative to `destination`'s component node.
    ///
    /// `Stack` joins the destination's tabs and any other position splits
    /// it. Without a destination the source goes to the right of the whole
    /// layout.
    pub fn move_placeholder(
        &mut self,
        source: PlaceholderId,
        destination: Option<PlaceholderId>,
        position: WindowPosition,
    ) -> bool {
        if !self.config.docking {
            return false;
        }
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        if !tree.placeholder(source).is_some_and(|p| p.is_showing()) {
            return false;
        }
        let node = destination.and_then(|d| tree.placeholder(d)?.node());
        let moved = match node {
            Some(node) if position == WindowPosition::Stack => tree.stack(source, node),
            Some(node) => tree.split(source, node, position),
            None => tree.add(source, WindowPosition::Right),
        };
        if moved {
            tracing::debug!(target: targets::TREE, ?source, ?destination, ?position, "placeholder moved");
            self.focus.stage(Some(source));
            self.schedule_update();
        }
        moved
    }

    /// Detach `source` into a new window at `point`.
    pub fn move_placeholder_to_point(&mut self, source: PlaceholderId, point: Point) -> bool {
        if !self.config.docking {
            return false;
        }
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        if !tree.placeholder(source).is_some_and(|p| p.is_showing()) {
            return false;
        }
        if tree.add_at_point(source, point).is_none() {
            return false;
        }
        tracing::debug!(target: targets::TREE, ?source, ?point, "placeholder detached");
        self.focus.stage(Some(source));
        self.schedule_update();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ComponentProvider;
    use crate::registry::ManagerRegistry;
    use horizon_dock_core::ManualClock;
    use std::sync::Arc;

    struct Panel {
        name: &'static str,
        transient: bool,
    }

    impl ComponentProvider for Panel {
        fn name(&self) -> &str {
            self.name
        }
        fn owner(&self) -> &str {
            "TestPlugin"
        }
        fn title(&self) -> String {
            self.name.to_string()
        }
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn panel(name: &'static str) -> ProviderRef {
        Arc::new(Panel { name, transient: false })
    }

    fn manager() -> DockingWindowManager {
        DockingWindowManager::builder("Tool")
            .clock(ManualClock::new().shared())
            .registry(ManagerRegistry::new())
            .build()
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut manager = manager();
        let listing = panel("Listing");
        manager.add_component(listing.clone(), true).unwrap();
        let err = manager.add_component(listing, true).unwrap_err();
        assert!(matches!(err, DockingError::ProviderAlreadyAdded { .. }));
    }

    #[test]
    fn test_default_help_registered() {
        let mut manager = manager();
        manager.add_component(panel("Listing"), false).unwrap();
        let location = manager
            .help_service()
            .help_location(&HelpTarget::provider("TestPlugin", "Listing"));
        assert_eq!(location, Some(HelpLocation::new("TestPlugin", "Listing")));
    }

    #[test]
    fn test_hide_clears_focus() {
        let mut manager = manager();
        let listing = panel("Listing");
        manager.add_component(listing.clone(), true).unwrap();
        let id = manager.active_placeholder(&listing).unwrap();
        assert_eq!(manager.next_focus_placeholder(), Some(id));

        assert!(manager.show_component(&listing, false));
        assert_eq!(manager.next_focus_placeholder(), None);
        assert!(!manager.is_visible_component(&listing));
        assert!(!manager.show_component(&panel("Other"), true));
    }

    #[test]
    fn test_removed_component_leaves_slot() {
        let mut manager = manager();
        let listing = panel("Listing");
        manager.add_component(listing.clone(), true).unwrap();
        let id = manager.active_placeholder(&listing).unwrap();

        assert!(manager.remove_component(&listing));
        assert!(!manager.contains_provider(&listing));
        let slot = manager.placeholder(id).unwrap();
        assert!(slot.is_inert());
        assert!(!slot.is_showing());

        manager.add_component(listing.clone(), true).unwrap();
        assert_eq!(manager.active_placeholder(&listing), Some(id));
    }

    #[test]
    fn test_transient_component_deleted() {
        let mut manager = manager();
        let results: ProviderRef = Arc::new(Panel {
            name: "Search Results",
            transient: true,
        });
        manager.add_component(results.clone(), true).unwrap();
        let id = manager.active_placeholder(&results).unwrap();
        manager.remove_component(&results);
        assert!(manager.placeholder(id).is_none());
    }

    #[test]
    fn test_local_action_needs_provider() {
        let mut manager = manager();
        let action: ActionRef = Arc::new(crate::action::DockingAction::new("Copy", "TestPlugin"));
        let err = manager.add_local_action(&panel("Listing"), action).unwrap_err();
        assert!(matches!(err, DockingError::UnknownProvider { .. }));
    }

    #[test]
    fn test_move_to_point_detaches() {
        let mut manager = manager();
        let listing = panel("Listing");
        let bytes = panel("Bytes");
        manager.add_component(listing.clone(), true).unwrap();
        manager.add_component(bytes.clone(), true).unwrap();
        let id = manager.active_placeholder(&bytes).unwrap();

        assert!(manager.move_placeholder_to_point(id, Point::new(300, 200)));
        assert_eq!(manager.windows(false).len(), 1);
        assert_eq!(manager.next_focus_placeholder(), Some(id));

        let listing_id = manager.active_placeholder(&listing).unwrap();
        assert!(manager.move_placeholder(id, Some(listing_id), WindowPosition::Stack));
        let tree = manager.tree().unwrap();
        assert_eq!(tree.placeholder(id).unwrap().node(), tree.placeholder(listing_id).unwrap().node());
        // The emptied window is destroyed with its last placeholder.
        assert!(manager.windows(false).is_empty());
    }
}
