//! The docking window manager.
//!
//! [`DockingWindowManager`] ties the window tree, the placeholders, the
//! action manager and the focus state together. It is a single-threaded
//! actor: every mutation happens on the thread that built it, and the host
//! drives it by calling [`process_events`](DockingWindowManager::process_events)
//! from its event loop. Mutations never touch the host directly; they
//! schedule a coalesced rebuild, and the rebuild publishes a
//! [`LayoutSnapshot`] on [`ManagerSignals::rebuilt`].
//!
//! # Example
//!
//! ```ignore
//! let mut manager = DockingWindowManager::builder("CodeBrowser")
//!     .config(DockingConfig::from_toml_str(&settings)?)
//!     .build();
//!
//! manager.signals().rebuilt.connect(|snapshot| host.render(snapshot));
//! manager.signals().focus_requested.connect(|request| host.focus(request));
//!
//! manager.add_component(listing, true)?;
//! manager.set_visible(true);
//!
//! loop {
//!     host.pump_events(&mut manager);
//!     manager.process_events();
//! }
//! ```

mod components;
mod keys;
mod persist;
mod rebuild;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use horizon_dock_core::logging::targets;
use horizon_dock_core::{
    Clock, CoalescingScheduler, SharedClock, Signal, SystemClock, TaskQueue, ThreadAffinity,
};

use crate::action::{ActionManager, ActionRef, ExecutableAction, PopupActionProvider};
use crate::config::DockingConfig;
use crate::context::{context_of, ActionContext};
use crate::error::Result;
use crate::focus::{ActivationTracker, FocusOwner, FocusTracker};
use crate::geometry::Rect;
use crate::handle::{CommandInbox, ManagerHandle};
use crate::help::{DefaultHelpService, HelpService};
use crate::menu::{MenuBarModel, ToolBarModel};
use crate::placeholder::{Placeholder, PlaceholderId};
use crate::placeholder_manager::PlaceholderManager;
use crate::preferences::{PreferenceState, PreferenceStore};
use crate::provider::{downcast_provider, ComponentProvider, ProviderKey, ProviderRef};
use crate::registry::{ManagerId, ManagerRegistry};
use crate::tree::{LayoutSnapshot, TreeShape, WindowId, WindowTree};
use crate::window_action::WindowActionManager;

/// A request for the host to move keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub window: WindowId,
    pub placeholder: PlaceholderId,
}

/// Notifications from a manager to its host and listeners.
pub struct ManagerSignals {
    /// The application asked to close the tool.
    pub close_requested: Signal<()>,

    /// The host should give keyboard focus to a component.
    pub focus_requested: Signal<FocusRequest>,

    /// A rebuild finished; the host should render this layout.
    pub rebuilt: Signal<LayoutSnapshot>,

    /// New status bar text.
    pub status_changed: Signal<String>,

    /// The host should beep: a key chord had nothing to do.
    pub alert: Signal<()>,

    /// Several actions claim a key chord; the host should let the user pick one.
    pub action_choice_requested: Signal<Vec<ExecutableAction>>,

    /// A component was brought to front repeatedly and should draw attention to itself.
    pub emphasize: Signal<PlaceholderId>,

    /// The host should raise a window.
    pub window_to_front: Signal<WindowId>,

    /// The focused component changed.
    pub focus_changed: Signal<Option<PlaceholderId>>,

    /// The focused component's action context changed.
    pub context_changed: Signal<ActionContext>,
}

impl ManagerSignals {
    fn new() -> Self {
        Self {
            close_requested: Signal::new(),
            focus_requested: Signal::new(),
            rebuilt: Signal::new(),
            status_changed: Signal::new(),
            alert: Signal::new(),
            action_choice_requested: Signal::new(),
            emphasize: Signal::new(),
            window_to_front: Signal::new(),
            focus_changed: Signal::new(),
            context_changed: Signal::new(),
        }
    }
}

/// Work that runs on the tick after it was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    FocusUpdate,
    SetFocused(PlaceholderId),
}

// ============================================================================
// Builder
// ============================================================================

/// Builds a [`DockingWindowManager`].
pub struct DockingWindowManagerBuilder {
    tool_name: String,
    config: DockingConfig,
    clock: Option<SharedClock>,
    registry: Option<Arc<ManagerRegistry>>,
    help: Option<Arc<dyn HelpService>>,
}

impl DockingWindowManagerBuilder {
    fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            config: DockingConfig::default(),
            clock: None,
            registry: None,
            help: None,
        }
    }

    pub fn config(mut self, config: DockingConfig) -> Self {
        self.config = config;
        self
    }

    /// Time source for every scheduler. Defaults to the system clock.
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Registry to join. Defaults to [`ManagerRegistry::global`].
    pub fn registry(mut self, registry: Arc<ManagerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn help_service(mut self, help: Arc<dyn HelpService>) -> Self {
        self.help = Some(help);
        self
    }

    /// Build the manager on the current thread, which becomes its home.
    pub fn build(self) -> DockingWindowManager {
        let config = self.config;
        let registry = self.registry.unwrap_or_else(ManagerRegistry::global);
        let inbox = CommandInbox::new();
        let id = ManagerId::next();
        registry.register(id, inbox.handle());

        let tree = WindowTree::new(
            self.tool_name.clone(),
            config.main_window_bounds,
            config.detached_window_size,
        );
        tracing::debug!(target: targets::MANAGER, manager = id.as_u64(), tool = %self.tool_name, "manager created");

        DockingWindowManager {
            id,
            tool_name: self.tool_name,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            affinity: ThreadAffinity::current(),
            tree: Some(tree),
            placeholders: PlaceholderManager::new(),
            actions: ActionManager::new(),
            window_actions: HashMap::new(),
            window_menu_actions: Vec::new(),
            focus: FocusTracker::new(config.recent_focus_capacity),
            activation: ActivationTracker::new(config.emphasis_window()),
            focus_owner: FocusOwner::None,
            rebuild: config.rebuild_scheduler(),
            rebuild_count: 0,
            deferred: TaskQueue::new(),
            inbox,
            preferences: PreferenceStore::new(),
            help: self.help.unwrap_or_else(|| Arc::new(DefaultHelpService::new())),
            registry,
            name_cache: HashMap::new(),
            popup_providers: Vec::new(),
            default_provider: None,
            windows_on_top: config.windows_on_top,
            visible: false,
            menu_showing: false,
            window_menu_showing: false,
            edit_overlay_active: false,
            status_text: String::new(),
            signals: ManagerSignals::new(),
            config,
        }
    }
}

// ============================================================================
// DockingWindowManager
// ============================================================================

/// Manages the docking windows of one tool.
///
/// Constructed hidden. Once [`set_visible(true)`](Self::set_visible) is
/// called the rebuild loop runs. After [`dispose`](Self::dispose) every
/// operation is a no-op or fails with [`DockingError::Disposed`].
///
/// [`DockingError::Disposed`]: crate::DockingError::Disposed
pub struct DockingWindowManager {
    id: ManagerId,
    tool_name: String,
    config: DockingConfig,
    clock: SharedClock,
    affinity: ThreadAffinity,

    /// `None` once disposed.
    tree: Option<WindowTree>,
    placeholders: PlaceholderManager,
    actions: ActionManager,
    window_actions: HashMap<WindowId, WindowActionManager>,
    /// Show-component and show-window actions from the last rebuild.
    window_menu_actions: Vec<ActionRef>,

    focus: FocusTracker,
    activation: ActivationTracker,
    focus_owner: FocusOwner,

    rebuild: CoalescingScheduler,
    rebuild_count: u64,
    deferred: TaskQueue<Deferred>,
    inbox: CommandInbox,

    preferences: PreferenceStore,
    help: Arc<dyn HelpService>,
    registry: Arc<ManagerRegistry>,
    name_cache: HashMap<String, ProviderRef>,
    popup_providers: Vec<Arc<dyn PopupActionProvider>>,
    default_provider: Option<ProviderRef>,

    windows_on_top: bool,
    visible: bool,
    menu_showing: bool,
    window_menu_showing: bool,
    edit_overlay_active: bool,
    status_text: String,
    signals: ManagerSignals,
}

impl DockingWindowManager {
    pub fn builder(tool_name: impl Into<String>) -> DockingWindowManagerBuilder {
        DockingWindowManagerBuilder::new(tool_name)
    }

    /// A manager with default configuration in the global registry.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self::builder(tool_name).build()
    }

    pub fn id(&self) -> ManagerId {
        self.id
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn config(&self) -> &DockingConfig {
        &self.config
    }

    pub fn signals(&self) -> &ManagerSignals {
        &self.signals
    }

    /// A `Send` handle for reaching this manager from other threads.
    pub fn handle(&self) -> ManagerHandle {
        self.inbox.handle()
    }

    pub fn help_service(&self) -> &Arc<dyn HelpService> {
        &self.help
    }

    /// The window tree, unless disposed.
    pub fn tree(&self) -> Option<&WindowTree> {
        self.tree.as_ref()
    }

    pub fn placeholder(&self, id: PlaceholderId) -> Option<&Placeholder> {
        self.tree.as_ref()?.placeholder(id)
    }

    pub fn is_disposed(&self) -> bool {
        self.tree.is_none()
    }

    fn now(&self) -> Instant {
        self.clock.now()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the tool. Rebuilds only run while visible.
    pub fn set_visible(&mut self, visible: bool) {
        if self.tree.is_none() || self.visible == visible {
            return;
        }
        self.visible = visible;
        self.registry.set_visible(self.id, visible);
        tracing::debug!(target: targets::MANAGER, visible, "visibility changed");
        if visible {
            self.schedule_update();
        }
    }

    /// Run queued commands, deferred work and any timers that came due.
    pub fn process_events(&mut self) {
        let now = self.now();
        self.process_events_at(now);
    }

    /// [`process_events`](Self::process_events) at an explicit instant.
    pub fn process_events_at(&mut self, now: Instant) {
        self.affinity.debug_assert_same_thread();
        for command in self.inbox.drain() {
            if self.tree.is_none() {
                return;
            }
            command.execute(self);
        }
        if self.tree.is_none() {
            return;
        }

        for task in self.deferred.take_ready() {
            match task {
                Deferred::FocusUpdate => self.update_focus(),
                Deferred::SetFocused(id) => self.set_focused_component(id),
            }
        }
        if self.rebuild.poll(now) {
            self.do_update();
        }
        self.poll_context_updates(now);
    }

    /// Whether a rebuild is waiting for its debounce delay.
    pub fn is_update_pending(&self) -> bool {
        self.rebuild.is_pending()
    }

    /// How many rebuild passes have run.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Ask the host to close the tool.
    pub fn close(&self) {
        tracing::debug!(target: targets::MANAGER, "close requested");
        self.signals.close_requested.emit(());
    }

    /// Tear the manager down. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.tree.is_none() {
            return;
        }
        self.rebuild.cancel();
        self.deferred.clear();
        for (_, mut manager) in self.window_actions.drain() {
            manager.dispose();
        }
        self.window_menu_actions.clear();
        self.actions.dispose();
        self.placeholders.clear();
        self.tree = None;
        self.focus.clear();
        self.focus.clear_history();
        self.focus.set_active_window(None);
        self.activation.clear();
        self.name_cache.clear();
        self.popup_providers.clear();
        self.default_provider = None;
        self.inbox.close();
        self.registry.unregister(self.id);
        tracing::debug!(target: targets::MANAGER, manager = self.id.as_u64(), "manager disposed");
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn contains_provider(&self, provider: &ProviderRef) -> bool {
        self.placeholders.contains_provider(provider)
    }

    pub fn active_placeholder(&self, provider: &ProviderRef) -> Option<PlaceholderId> {
        self.placeholders.active_placeholder(provider)
    }

    /// Every registered provider, in registration order.
    pub fn active_providers(&self) -> Vec<ProviderRef> {
        self.placeholders.active_providers()
    }

    /// A registered provider by name.
    pub fn component_provider(&mut self, name: &str) -> Option<ProviderRef> {
        if let Some(cached) = self.name_cache.get(name) {
            if self.placeholders.contains_provider(cached) {
                return Some(cached.clone());
            }
            self.name_cache.remove(name);
        }
        let found = self
            .placeholders
            .active_providers()
            .into_iter()
            .find(|p| p.name() == name)?;
        self.name_cache.insert(name.to_string(), found.clone());
        Some(found)
    }

    /// Every registered provider of concrete type `T`.
    pub fn component_providers<T: ComponentProvider + 'static>(&self) -> Vec<Arc<T>> {
        self.placeholders
            .active_providers()
            .iter()
            .filter_map(downcast_provider::<T>)
            .collect()
    }

    pub fn providers_for_owner(&self, owner: &str) -> Vec<ProviderRef> {
        self.placeholders
            .active_providers()
            .into_iter()
            .filter(|p| p.owner() == owner)
            .collect()
    }

    /// The window showing `provider`.
    pub fn provider_window(&self, provider: &ProviderRef) -> Option<WindowId> {
        let id = self.placeholders.active_placeholder(provider)?;
        self.tree.as_ref()?.window_of(id)
    }

    /// The provider that holds focus.
    pub fn active_component_provider(&self) -> Option<ProviderRef> {
        self.placeholders.provider_of(self.focus.focused()?)
    }

    /// Whether `provider` has focus in the tool the user is working in.
    pub fn is_active_provider(&self, provider: &ProviderRef) -> bool {
        self.registry.active() == Some(self.id)
            && self
                .active_component_provider()
                .is_some_and(|p| ProviderKey::of(&p) == ProviderKey::of(provider))
    }

    pub fn focused_placeholder(&self) -> Option<PlaceholderId> {
        self.focus.focused()
    }

    /// The placeholder that will be focused on the next focus update.
    pub fn next_focus_placeholder(&self) -> Option<PlaceholderId> {
        self.focus.next()
    }

    /// Recently focused placeholders, most recent first.
    pub fn recent_focus(&self) -> Vec<PlaceholderId> {
        self.focus.recent()
    }

    pub fn shape(&self) -> Option<TreeShape> {
        self.tree.as_ref().map(WindowTree::shape)
    }

    pub fn layout_snapshot(&self) -> Option<LayoutSnapshot> {
        self.tree
            .as_ref()
            .map(|tree| tree.layout_snapshot(self.windows_on_top))
    }

    /// The provider whose context stands in when nothing is focused.
    pub fn set_default_component(&mut self, provider: Option<ProviderRef>) {
        self.default_provider = provider;
    }

    pub fn default_component(&self) -> Option<&ProviderRef> {
        self.default_provider.as_ref()
    }

    // ========================================================================
    // Windows
    // ========================================================================

    pub fn windows_on_top(&self) -> bool {
        self.windows_on_top
    }

    /// Keep detached windows above the main window.
    pub fn set_windows_on_top(&mut self, on_top: bool) {
        if self.windows_on_top != on_top {
            self.windows_on_top = on_top;
            self.schedule_update();
        }
    }

    /// Every window, the main one first when included.
    pub fn windows(&self, include_main: bool) -> Vec<WindowId> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        tree.windows()
            .into_iter()
            .filter(|w| include_main || *w != WindowId::Main)
            .collect()
    }

    /// Ask the host to raise `window`.
    pub fn window_to_front(&self, window: WindowId) -> bool {
        if !self.tree.as_ref().is_some_and(|t| t.contains_window(window)) {
            return false;
        }
        self.signals.window_to_front.emit(window);
        true
    }

    /// Record where the host placed `window`.
    pub fn set_window_bounds(&mut self, window: WindowId, bounds: Rect) -> bool {
        self.tree
            .as_mut()
            .is_some_and(|tree| tree.set_window_bounds(window, bounds))
    }

    /// Rename the main window.
    pub fn set_tool_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if let Some(tree) = &mut self.tree {
            tree.set_title(name.clone());
            self.tool_name = name;
            self.schedule_update();
        }
    }

    pub fn menu_bar(&self, window: WindowId) -> Option<MenuBarModel> {
        self.window_actions.get(&window).map(WindowActionManager::menu_bar)
    }

    pub fn tool_bar(&self, window: WindowId) -> Option<ToolBarModel> {
        self.window_actions.get(&window).map(WindowActionManager::tool_bar)
    }

    // ========================================================================
    // Host state
    // ========================================================================

    /// The host reports whether any menu is open.
    pub fn set_menu_showing(&mut self, showing: bool) {
        self.menu_showing = showing;
    }

    /// The host reports whether the Window menu is open.
    pub fn set_window_menu_showing(&mut self, showing: bool) {
        self.window_menu_showing = showing;
    }

    /// The host reports whether the in-place text edit overlay is up.
    pub fn set_edit_overlay_active(&mut self, active: bool) {
        self.edit_overlay_active = active;
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn set_status_text(&mut self, text: impl Into<String>) {
        if self.tree.is_none() {
            return;
        }
        self.status_text = text.into();
        self.signals.status_changed.emit(self.status_text.clone());
    }

    // ========================================================================
    // Context
    // ========================================================================

    /// The tool-wide context: the default provider's, or an empty one.
    pub fn global_context(&self) -> ActionContext {
        self.default_provider
            .as_ref()
            .filter(|p| self.placeholders.contains_provider(p))
            .map(context_of)
            .unwrap_or_default()
    }

    /// The focused provider's context, or the global one.
    pub fn local_context(&self) -> ActionContext {
        self.active_component_provider()
            .map(|p| context_of(&p))
            .unwrap_or_else(|| self.global_context())
    }

    // ========================================================================
    // Popup actions
    // ========================================================================

    pub fn add_popup_action_provider(&mut self, provider: Arc<dyn PopupActionProvider>) {
        self.popup_providers.push(provider);
    }

    pub fn remove_popup_action_provider(&mut self, provider: &Arc<dyn PopupActionProvider>) -> bool {
        let before = self.popup_providers.len();
        self.popup_providers.retain(|p| !Arc::ptr_eq(p, provider));
        before != self.popup_providers.len()
    }

    /// Actions for a popup menu over `provider`'s component.
    pub fn popup_actions(&self, provider: &ProviderRef) -> Vec<ActionRef> {
        if !self.placeholders.contains_provider(provider) {
            return Vec::new();
        }
        let context = context_of(provider);
        let mut list: Vec<ActionRef> = self
            .actions
            .local_actions(provider)
            .into_iter()
            .filter(|a| a.popup_menu_data().is_some() && a.is_add_to_popup(&context))
            .collect();
        list.extend(
            self.actions
                .tool_actions()
                .iter()
                .filter(|a| {
                    a.popup_menu_data().is_some()
                        && a.is_valid_context(&context)
                        && a.is_add_to_popup(&context)
                })
                .cloned(),
        );
        for contributor in &self.popup_providers {
            list.extend(
                contributor
                    .popup_actions(&context)
                    .into_iter()
                    .filter(|a| a.is_add_to_popup(&context)),
            );
        }
        list
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    pub fn preference_state(&self, key: &str) -> Option<&PreferenceState> {
        self.preferences.get(key)
    }

    pub fn put_preference_state(&mut self, key: impl Into<String>, state: PreferenceState) -> Result<()> {
        self.preferences.put(key, state)
    }

    pub fn remove_preference_state(&mut self, key: &str) -> Option<PreferenceState> {
        self.preferences.remove(key)
    }
}

impl Drop for DockingWindowManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for DockingWindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockingWindowManager")
            .field("id", &self.id)
            .field("tool_name", &self.tool_name)
            .field("visible", &self.visible)
            .field("disposed", &self.tree.is_none())
            .field("providers", &self.placeholders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_dock_core::ManualClock;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct Panel {
        name: &'static str,
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
    }

    fn manager(clock: &ManualClock) -> DockingWindowManager {
        let mut manager = DockingWindowManager::builder("Tool")
            .clock(clock.shared())
            .registry(ManagerRegistry::new())
            .build();
        manager.set_visible(true);
        manager
    }

    #[test]
    fn test_rebuild_runs_only_when_visible() {
        let clock = ManualClock::new();
        let mut manager = DockingWindowManager::builder("Tool")
            .clock(clock.shared())
            .registry(ManagerRegistry::new())
            .build();
        let provider: ProviderRef = Arc::new(Panel { name: "Listing" });
        manager.add_component(provider, true).unwrap();
        clock.advance(Duration::from_secs(1));
        manager.process_events();
        assert_eq!(manager.rebuild_count(), 0);

        manager.set_visible(true);
        clock.advance(Duration::from_secs(1));
        manager.process_events();
        assert_eq!(manager.rebuild_count(), 1);
    }

    #[test]
    fn test_component_provider_cache() {
        let clock = ManualClock::new();
        let mut manager = manager(&clock);
        let provider: ProviderRef = Arc::new(Panel { name: "Listing" });
        manager.add_component(provider.clone(), true).unwrap();

        assert!(manager.component_provider("Listing").is_some());
        assert_eq!(manager.component_providers::<Panel>().len(), 1);
        manager.remove_component(&provider);
        assert!(manager.component_provider("Listing").is_none());
    }

    #[test]
    fn test_status_text_signal() {
        let clock = ManualClock::new();
        let mut manager = manager(&clock);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        manager.signals().status_changed.connect(move |text| sink.lock().push(text.clone()));
        manager.set_status_text("Loaded");
        assert_eq!(manager.status_text(), "Loaded");
        assert_eq!(*seen.lock(), vec!["Loaded".to_string()]);
    }

    #[test]
    fn test_dispose_unregisters_and_refuses_work() {
        let clock = ManualClock::new();
        let registry = ManagerRegistry::new();
        let mut manager = DockingWindowManager::builder("Tool")
            .clock(clock.shared())
            .registry(registry.clone())
            .build();
        let handle = manager.handle();
        assert_eq!(registry.len(), 1);

        manager.dispose();
        assert!(manager.is_disposed());
        assert!(registry.is_empty());
        assert!(!handle.is_alive());
        let provider: ProviderRef = Arc::new(Panel { name: "Listing" });
        assert!(matches!(
            manager.add_component(provider, true),
            Err(crate::DockingError::Disposed)
        ));
        manager.dispose();
    }

    #[test]
    fn test_close_emits_signal() {
        let clock = ManualClock::new();
        let manager = manager(&clock);
        let closed = Arc::new(Mutex::new(false));
        let flag = closed.clone();
        manager.signals().close_requested.connect(move |_| *flag.lock() = true);
        manager.close();
        assert!(*closed.lock());
    }
}
