//! The rebuild loop, focus arbitration and action-context updates.

use std::collections::HashSet;
use std::time::Instant;

use horizon_dock_core::logging::{span_names, targets};
use horizon_dock_core::PerfSpan;

use super::{Deferred, DockingWindowManager, FocusRequest};
use crate::action::ActionRef;
use crate::focus::FocusOwner;
use crate::placeholder::PlaceholderId;
use crate::provider::ProviderRef;
use crate::tree::WindowId;
use crate::window_action::{ScheduledUpdate, WindowActionManager};
use crate::window_menu::{self, MenuEntry, WindowEntry};

impl DockingWindowManager {
    // ========================================================================
    // Rebuild
    // ========================================================================

    /// Ask for a rebuild. Bursts of requests collapse into one pass.
    pub(super) fn schedule_update(&mut self) {
        if self.tree.is_none() {
            return;
        }
        let now = self.now();
        self.rebuild.request(now);
    }

    #[tracing::instrument(skip(self), target = "horizon_dock::manager", level = "trace")]
    pub(super) fn do_update(&mut self) {
        if !self.visible || self.tree.is_none() {
            return;
        }
        let _span = PerfSpan::new(span_names::REBUILD);
        let now = self.now();

        if let Some(tree) = self.tree.as_mut() {
            tree.update();
        }
        self.sync_window_action_managers();

        if self.config.docking {
            if self.window_menu_showing {
                tracing::trace!(target: targets::MANAGER, "window menu open, menu rebuild postponed");
                self.rebuild.request(now);
            } else {
                self.window_menu_actions = self.build_window_menu();
            }
        }
        self.install_window_actions(now);

        if let Some(snapshot) = self.layout_snapshot() {
            self.signals.rebuilt.emit(snapshot);
        }
        self.deferred.post(Deferred::FocusUpdate);
        self.rebuild_count += 1;
        tracing::debug!(target: targets::MANAGER, pass = self.rebuild_count, "layout rebuilt");
    }

    /// One action manager per window, no more and no fewer.
    fn sync_window_action_managers(&mut self) {
        let Some(tree) = &self.tree else {
            return;
        };
        let windows: HashSet<WindowId> = tree.windows().into_iter().collect();
        self.window_actions.retain(|window, manager| {
            let keep = windows.contains(window);
            if !keep {
                manager.dispose();
            }
            keep
        });
        for window in windows {
            let scheduler = self.config.context_scheduler();
            self.window_actions
                .entry(window)
                .or_insert_with(|| WindowActionManager::new(window, scheduler));
        }
    }

    fn build_window_menu(&self) -> Vec<ActionRef> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        let handle = self.handle();

        let entries: Vec<MenuEntry> = self
            .placeholders
            .active_providers_to_placeholders()
            .into_iter()
            .filter_map(|(provider, id)| {
                let placeholder = tree.placeholder(id)?;
                Some(MenuEntry {
                    placeholder: id,
                    title: placeholder.title().to_string(),
                    icon: placeholder.icon().map(str::to_string),
                    sub_menu: provider.window_sub_menu_name(),
                    transient: provider.is_transient(),
                })
            })
            .collect();

        let windows: Vec<WindowEntry> = tree
            .detached_windows()
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                let window = WindowId::Detached(node);
                let titles: Vec<&str> = tree
                    .placeholders_in_window(window)
                    .into_iter()
                    .filter_map(|id| tree.placeholder(id))
                    .filter(|p| p.is_showing())
                    .map(|p| p.title())
                    .collect();
                let title = if titles.is_empty() {
                    format!("Window {}", index + 1)
                } else {
                    titles.join(", ")
                };
                WindowEntry { window, title }
            })
            .collect();

        let mut actions = window_menu::component_actions(&handle, entries);
        actions.extend(window_menu::window_actions(&handle, &windows));
        actions
    }

    /// Hand each window the actions it carries and queue an enablement pass.
    fn install_window_actions(&mut self, now: Instant) {
        let all: Vec<ActionRef> = self
            .actions
            .tool_actions()
            .iter()
            .chain(&self.window_menu_actions)
            .cloned()
            .collect();
        for (window, manager) in &mut self.window_actions {
            let is_main = *window == WindowId::Main;
            manager.set_actions(all.iter().filter(|a| a.should_add_to_window(is_main)));
            manager.context_changed(None, now);
        }
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Apply the staged focus request, one tick after a rebuild.
    pub(super) fn update_focus(&mut self) {
        if self.rebuild.is_pending() {
            return;
        }
        let target = match self.focus.take_next() {
            Some(id) => Some(id),
            None if self.focus_owner == FocusOwner::None => self.find_next_focused(),
            None => None,
        };
        let Some(id) = target else {
            return;
        };
        let Some(tree) = &self.tree else {
            return;
        };
        let showing = tree.placeholder(id).is_some_and(|p| p.is_showing() && !p.is_inert());
        let Some(window) = tree.window_of(id).filter(|_| showing) else {
            return;
        };

        if self.focus.active_window().is_none() {
            // Nothing of ours is active; try again when a window activates.
            self.focus.stage(Some(id));
            return;
        }
        tracing::trace!(target: targets::FOCUS, placeholder = ?id, ?window, "focus requested");
        self.signals.focus_requested.emit(FocusRequest { window, placeholder: id });
    }

    /// The most recent still-showing placeholder, else the default provider's.
    fn find_next_focused(&mut self) -> Option<PlaceholderId> {
        let tree = self.tree.as_ref()?;
        let candidate = self.focus.refocus_candidate(|id| {
            tree.placeholder(*id)
                .is_some_and(|p| p.is_showing() && !p.is_inert() && p.node().is_some())
        });
        candidate.or_else(|| {
            let provider = self.default_provider.as_ref()?;
            self.placeholders.active_placeholder(provider)
        })
    }

    /// Make `id` the focused placeholder.
    ///
    /// Stale ids, hidden placeholders and the already-focused one are ignored.
    pub(super) fn set_focused_component(&mut self, id: PlaceholderId) {
        let now = self.now();
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        if !tree.placeholder(id).is_some_and(|p| p.is_showing() && !p.is_inert()) {
            tracing::trace!(target: targets::FOCUS, placeholder = ?id, "ignoring focus on stale placeholder");
            return;
        }
        if self.focus.focused() == Some(id) {
            return;
        }

        if let Some(previous) = self.focus.set_focused(Some(id)) {
            if let Some(placeholder) = tree.placeholder_mut(previous) {
                placeholder.set_selected(false);
            }
        }
        if let Some(placeholder) = tree.placeholder_mut(id) {
            placeholder.set_selected(true);
        }
        let window = tree.window_of(id);
        if let Some(window) = window {
            tree.set_last_focused(window, Some(id));
        }
        tracing::debug!(target: targets::FOCUS, placeholder = ?id, ?window, "focus changed");
        self.signals.focus_changed.emit(Some(id));

        if let Some(manager) = window.and_then(|w| self.window_actions.get_mut(&w)) {
            manager.context_changed(Some(id), now);
        }
    }

    /// The host reports what holds keyboard focus inside `window`.
    pub fn focus_owner_changed(&mut self, window: WindowId, owner: FocusOwner) {
        let Some(tree) = &self.tree else {
            return;
        };
        if !tree.contains_window(window) {
            return;
        }
        self.focus.set_active_window(Some(window));
        self.focus_owner = owner;

        match owner {
            FocusOwner::Component(id) => {
                self.deferred.post(Deferred::SetFocused(id));
            }
            FocusOwner::EditOverlay if self.edit_overlay_active => {}
            FocusOwner::Unmanaged | FocusOwner::EditOverlay => {
                if let Some(placeholder) = tree.last_focused(window) {
                    tracing::trace!(target: targets::FOCUS, ?window, "redirecting focus to last focused component");
                    self.signals.focus_requested.emit(FocusRequest { window, placeholder });
                }
            }
            FocusOwner::None => {}
        }
    }

    /// The host reports that one of this manager's windows gained or lost
    /// activation.
    pub fn window_activated(&mut self, window: WindowId, active: bool) {
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        if !tree.contains_window(window) {
            return;
        }
        let focused = self.focus.focused().filter(|&id| tree.window_of(id) == Some(window));

        if active {
            self.registry.set_active(self.id);
            self.focus.set_active_window(Some(window));
            if let Some(placeholder) = focused.and_then(|id| tree.placeholder_mut(id)) {
                placeholder.set_selected(true);
            }
            if self.focus.next().is_some() {
                self.deferred.post(Deferred::FocusUpdate);
            }
        } else {
            if self.focus.active_window() == Some(window) {
                self.focus.set_active_window(None);
            }
            if let Some(placeholder) = focused.and_then(|id| tree.placeholder_mut(id)) {
                placeholder.set_selected(false);
            }
        }
        tracing::trace!(target: targets::FOCUS, ?window, active, "window activation changed");
    }

    // ========================================================================
    // Action context
    // ========================================================================

    /// `provider`'s context changed; `None` means every window's did.
    pub fn context_changed(&mut self, provider: Option<&ProviderRef>) {
        let now = self.now();
        match provider {
            Some(provider) => {
                let Some(id) = self.placeholders.active_placeholder(provider) else {
                    return;
                };
                let Some(window) = self.tree.as_ref().and_then(|t| t.window_of(id)) else {
                    return;
                };
                if let Some(manager) = self.window_actions.get_mut(&window) {
                    manager.context_changed(Some(id), now);
                }
            }
            None => {
                for manager in self.window_actions.values_mut() {
                    manager.context_changed(None, now);
                }
            }
        }
    }

    /// Apply context updates whose debounce delay has passed.
    pub(super) fn poll_context_updates(&mut self, now: Instant) {
        let due: Vec<ScheduledUpdate> = self
            .window_actions
            .values_mut()
            .filter_map(|manager| manager.poll(now))
            .collect();
        if due.is_empty() {
            return;
        }
        let local = self.local_context();
        let global = self.global_context();
        for update in &due {
            if let Some(manager) = self.window_actions.get(&update.window) {
                manager.apply_context(&local, &global);
            }
        }
        let focused = self.focus.focused();
        if focused.is_some() && due.iter().any(|u| u.placeholder == focused) {
            self.signals.context_changed.emit(local);
        }
    }
}
