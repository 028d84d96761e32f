//! Per-window menu bar and toolbar actions.

use std::sync::Arc;
use std::time::Instant;

use horizon_dock_core::logging::targets;
use horizon_dock_core::CoalescingScheduler;

use crate::action::{ActionKey, ActionRef, WrappingAction};
use crate::context::ActionContext;
use crate::menu::{MenuBarModel, ToolBarModel};
use crate::placeholder::PlaceholderId;
use crate::tree::WindowId;

/// A context update that has come due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledUpdate {
    pub window: WindowId,
    /// The placeholder whose context changed, if any.
    pub placeholder: Option<PlaceholderId>,
}

/// Holds the menu and toolbar actions of one window and keeps their
/// enablement in step with the action context.
///
/// Each action is held through a [`WrappingAction`] proxy. Context changes
/// arrive in bursts, so they are debounced through the window's own
/// [`CoalescingScheduler`] and applied once it fires.
pub struct WindowActionManager {
    window: WindowId,
    proxies: Vec<(ActionKey, ActionRef)>,
    scheduler: CoalescingScheduler,
    scheduled: Option<PlaceholderId>,
    disposed: bool,
}

impl WindowActionManager {
    pub fn new(window: WindowId, scheduler: CoalescingScheduler) -> Self {
        Self {
            window,
            proxies: Vec::new(),
            scheduler,
            scheduled: None,
            disposed: false,
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Replace every action.
    pub fn set_actions<'a>(&mut self, actions: impl IntoIterator<Item = &'a ActionRef>) {
        self.proxies.clear();
        for action in actions {
            self.add_action(action.clone());
        }
    }

    /// Add an action if it has menu bar or toolbar data.
    pub fn add_action(&mut self, action: ActionRef) -> bool {
        if action.menu_bar_data().is_none() && action.tool_bar_data().is_none() {
            return false;
        }
        let key = ActionKey::of(&action);
        if self.proxies.iter().any(|(k, _)| *k == key) {
            return false;
        }
        let proxy: ActionRef = Arc::new(WrappingAction::new(action));
        self.proxies.push((key, proxy));
        true
    }

    pub fn remove_action(&mut self, action: &ActionRef) -> bool {
        let key = ActionKey::of(action);
        let before = self.proxies.len();
        self.proxies.retain(|(k, _)| *k != key);
        before != self.proxies.len()
    }

    pub fn contains(&self, action: &ActionRef) -> bool {
        let key = ActionKey::of(action);
        self.proxies.iter().any(|(k, _)| *k == key)
    }

    /// The proxies, in insertion order.
    pub fn actions(&self) -> Vec<ActionRef> {
        self.proxies.iter().map(|(_, proxy)| proxy.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn menu_bar(&self) -> MenuBarModel {
        MenuBarModel::build(self.proxies.iter().map(|(_, proxy)| proxy))
    }

    pub fn tool_bar(&self) -> ToolBarModel {
        ToolBarModel::build(self.proxies.iter().map(|(_, proxy)| proxy))
    }

    // ========================================================================
    // Context updates
    // ========================================================================

    /// Note that `placeholder`'s context changed and schedule an update.
    pub fn context_changed(&mut self, placeholder: Option<PlaceholderId>, now: Instant) {
        if self.disposed {
            return;
        }
        self.scheduled = placeholder;
        self.scheduler.request(now);
    }

    pub fn is_update_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// The scheduled update, once its debounce delay has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ScheduledUpdate> {
        if self.disposed || !self.scheduler.poll(now) {
            return None;
        }
        Some(ScheduledUpdate {
            window: self.window,
            placeholder: self.scheduled,
        })
    }

    /// Recompute enablement of every action.
    ///
    /// An action takes the local context if it understands it, otherwise
    /// the global one, and is disabled if it understands neither.
    pub fn apply_context(&self, local: &ActionContext, global: &ActionContext) {
        if self.disposed {
            return;
        }
        for (_, action) in &self.proxies {
            let enabled = if action.is_valid_context(local) {
                action.is_enabled_for_context(local)
            } else if action.is_valid_global_context(global) {
                action.is_enabled_for_context(global)
            } else {
                false
            };
            action.set_enabled(enabled);
        }
        tracing::trace!(
            target: targets::ACTIONS,
            window = ?self.window,
            actions = self.proxies.len(),
            "action enablement updated"
        );
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        self.scheduler.cancel();
        self.proxies.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DockingAction, DockingActionIf, MenuData, ToolBarData};
    use std::time::Duration;

    #[derive(Clone)]
    struct Selection;

    fn manager() -> WindowActionManager {
        let delay = Duration::from_millis(500);
        WindowActionManager::new(WindowId::Main, CoalescingScheduler::new(delay, delay))
    }

    #[test]
    fn test_only_menu_and_toolbar_actions_kept() {
        let mut manager = manager();
        let menu: ActionRef = Arc::new(DockingAction::new("Open", "P").with_menu_bar_data(MenuData::new(["File", "Open"])));
        let tool: ActionRef = Arc::new(DockingAction::new("Run", "P").with_tool_bar_data(ToolBarData::new("run.png")));
        let key_only: ActionRef = Arc::new(DockingAction::new("Hidden", "P"));
        manager.set_actions(&vec![menu.clone(), tool.clone(), key_only.clone()]);

        assert_eq!(manager.len(), 2);
        assert!(manager.contains(&menu));
        assert!(!manager.contains(&key_only));
        assert!(!manager.add_action(menu.clone()));
        assert_eq!(manager.menu_bar().menu_count(), 1);
        assert_eq!(manager.tool_bar().items().count(), 1);

        assert!(manager.remove_action(&tool));
        assert!(manager.tool_bar().is_empty());
    }

    #[test]
    fn test_context_update_debounced() {
        let mut manager = manager();
        let local_only: ActionRef = Arc::new(
            DockingAction::new("Local", "P")
                .with_menu_bar_data(MenuData::new(["Edit", "Local"]))
                .valid_when(|ctx| ctx.context_object::<Selection>().is_some())
                .enabled_when(|_| true),
        );
        manager.add_action(local_only.clone());

        let start = Instant::now();
        manager.context_changed(None, start);
        manager.context_changed(None, start + Duration::from_millis(100));
        assert!(manager.poll(start + Duration::from_millis(400)).is_none());
        let update = manager.poll(start + Duration::from_millis(600)).unwrap();
        assert_eq!(update.window, WindowId::Main);

        manager.apply_context(&ActionContext::new(), &ActionContext::new());
        assert!(!local_only.is_enabled());

        let local = ActionContext::new().with_context_object(Selection);
        manager.apply_context(&local, &ActionContext::new());
        assert!(local_only.is_enabled());
    }

    #[test]
    fn test_disposed_manager_ignores_updates() {
        let mut manager = manager();
        let action: ActionRef = Arc::new(
            DockingAction::new("A", "P")
                .with_menu_bar_data(MenuData::new(["M", "A"]))
                .with_enabled(true),
        );
        manager.add_action(action.clone());
        let now = Instant::now();
        manager.context_changed(None, now);
        manager.dispose();

        assert!(manager.poll(now + Duration::from_secs(1)).is_none());
        assert!(manager.is_empty());
        manager.context_changed(None, now);
        assert!(!manager.is_update_pending());
    }
}
