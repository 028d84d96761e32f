//! The closure-configured action.

use std::fmt::Write as _;

use horizon_dock_core::Signal;
use parking_lot::RwLock;

use super::{ActionPropertyChange, DockingActionIf, KeyBindingData, MenuData, ToolBarData};
use crate::context::ActionContext;
use crate::help::HelpLocation;

type ContextPredicate = Box<dyn Fn(&ActionContext) -> bool + Send + Sync>;
type PerformFn = Box<dyn Fn(&ActionContext) + Send + Sync>;

/// Internal mutable state for a [`DockingAction`].
struct DockingActionState {
    description: String,
    enabled: bool,
    menu_bar_data: Option<MenuData>,
    popup_menu_data: Option<MenuData>,
    tool_bar_data: Option<ToolBarData>,
    key_binding_data: Option<KeyBindingData>,
    default_key_binding_data: Option<KeyBindingData>,
    help_location: Option<HelpLocation>,
}

/// An action whose behavior is supplied as closures.
///
/// Presentation data can be changed at any time; each change is announced
/// on [`property_changed`](DockingActionIf::property_changed). Predicates
/// left unset fall back to the trait defaults.
///
/// ```ignore
/// let go_to = DockingAction::new("Go To Address", "CodeBrowserPlugin")
///     .with_key_binding(KeyBindingData::parse("G")?)
///     .with_menu_bar_data(MenuData::new(["Navigation", "Go To..."]))
///     .valid_when(|ctx| ctx.is_from("CodeBrowserPlugin", "Listing"))
///     .on_perform(|ctx| show_go_to_dialog(ctx));
/// ```
pub struct DockingAction {
    name: String,
    owner: String,
    state: RwLock<DockingActionState>,
    perform: PerformFn,
    enabled_when: Option<ContextPredicate>,
    valid_when: Option<ContextPredicate>,
    valid_global_when: Option<ContextPredicate>,
    popup_when: Option<ContextPredicate>,
    detached_windows: bool,
    property_changed: Signal<ActionPropertyChange>,
}

impl DockingAction {
    /// Create an enabled action that does nothing when performed.
    ///
    /// Its help location defaults to topic `owner`, anchor `name`.
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        let name = name.into();
        let owner = owner.into();
        let help_location = HelpLocation::new(owner.clone(), name.clone());
        Self {
            name,
            owner,
            state: RwLock::new(DockingActionState {
                description: String::new(),
                enabled: true,
                menu_bar_data: None,
                popup_menu_data: None,
                tool_bar_data: None,
                key_binding_data: None,
                default_key_binding_data: None,
                help_location: Some(help_location),
            }),
            perform: Box::new(|_| {}),
            enabled_when: None,
            valid_when: None,
            valid_global_when: None,
            popup_when: None,
            detached_windows: false,
            property_changed: Signal::new(),
        }
    }

    // ========================================================================
    // Behavior
    // ========================================================================

    /// Set the callback run when the action is performed.
    pub fn on_perform<F>(mut self, perform: F) -> Self
    where
        F: Fn(&ActionContext) + Send + Sync + 'static,
    {
        self.perform = Box::new(perform);
        self
    }

    /// Decide enablement per context instead of using the enabled flag.
    pub fn enabled_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ActionContext) -> bool + Send + Sync + 'static,
    {
        self.enabled_when = Some(Box::new(predicate));
        self
    }

    /// Restrict the contexts the action understands.
    pub fn valid_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ActionContext) -> bool + Send + Sync + 'static,
    {
        self.valid_when = Some(Box::new(predicate));
        self
    }

    /// Restrict the global contexts the action understands.
    pub fn valid_global_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ActionContext) -> bool + Send + Sync + 'static,
    {
        self.valid_global_when = Some(Box::new(predicate));
        self
    }

    /// Decide popup membership per context.
    pub fn popup_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ActionContext) -> bool + Send + Sync + 'static,
    {
        self.popup_when = Some(Box::new(predicate));
        self
    }

    /// Let detached windows carry this action in their menu bar and toolbar.
    pub fn with_detached_windows(mut self, allowed: bool) -> Self {
        self.detached_windows = allowed;
        self
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.set_description(description);
        self
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        self.set_enabled(enabled);
        self
    }

    pub fn with_menu_bar_data(self, data: MenuData) -> Self {
        self.set_menu_bar_data(Some(data));
        self
    }

    pub fn with_popup_menu_data(self, data: MenuData) -> Self {
        self.set_popup_menu_data(Some(data));
        self
    }

    pub fn with_tool_bar_data(self, data: ToolBarData) -> Self {
        self.set_tool_bar_data(Some(data));
        self
    }

    pub fn with_key_binding(self, data: KeyBindingData) -> Self {
        self.set_key_binding_data(Some(data));
        self
    }

    pub fn with_help_location(self, location: HelpLocation) -> Self {
        self.set_help_location(Some(location));
        self
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let description = description.into();
        {
            let mut state = self.state.write();
            if state.description == description {
                return;
            }
            state.description = description;
        }
        self.property_changed.emit(ActionPropertyChange::Description);
    }

    pub fn set_menu_bar_data(&self, data: Option<MenuData>) {
        self.state.write().menu_bar_data = data;
        self.property_changed.emit(ActionPropertyChange::MenuBarData);
    }

    pub fn set_popup_menu_data(&self, data: Option<MenuData>) {
        self.state.write().popup_menu_data = data;
        self.property_changed.emit(ActionPropertyChange::PopupMenuData);
    }

    pub fn set_tool_bar_data(&self, data: Option<ToolBarData>) {
        self.state.write().tool_bar_data = data;
        self.property_changed.emit(ActionPropertyChange::ToolBarData);
    }

    /// Update the toolbar data in place, if the action has any.
    pub(crate) fn update_tool_bar_data(&self, update: impl FnOnce(&mut ToolBarData)) {
        {
            let mut state = self.state.write();
            match state.tool_bar_data.as_mut() {
                Some(data) => update(data),
                None => return,
            }
        }
        self.property_changed.emit(ActionPropertyChange::ToolBarData);
    }

    /// Point help for this action somewhere, or mark it as having none.
    pub fn set_help_location(&self, location: Option<HelpLocation>) {
        self.state.write().help_location = location;
    }

    /// A multi-line description of the action for help authors.
    pub fn help_info(&self) -> String {
        let state = self.state.read();
        let mut info = format!("   ACTION:    {} - {}\n", self.owner, self.name);
        if let Some(menu) = &state.menu_bar_data {
            let _ = writeln!(info, "        MENU PATH:     {}", menu.path_string());
            if let Some(group) = menu.group() {
                let _ = writeln!(info, "        MENU GROUP:    {group}");
            }
        }
        if let Some(popup) = &state.popup_menu_data {
            let _ = writeln!(info, "        POPUP PATH:    {}", popup.path_string());
        }
        if let Some(group) = state.tool_bar_data.as_ref().and_then(|t| t.group()) {
            let _ = writeln!(info, "        TOOLBAR GROUP: {group}");
        }
        if let Some(binding) = &state.key_binding_data {
            let _ = writeln!(info, "        KEYBINDING:    {}", binding.chord());
        }
        info
    }
}

impl DockingActionIf for DockingAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn description(&self) -> String {
        self.state.read().description.clone()
    }

    fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    fn set_enabled(&self, enabled: bool) -> bool {
        {
            let mut state = self.state.write();
            if state.enabled == enabled {
                return enabled;
            }
            state.enabled = enabled;
        }
        self.property_changed.emit(ActionPropertyChange::Enabled(enabled));
        !enabled
    }

    fn is_enabled_for_context(&self, context: &ActionContext) -> bool {
        match &self.enabled_when {
            Some(predicate) => predicate(context),
            None => self.is_enabled(),
        }
    }

    fn is_valid_context(&self, context: &ActionContext) -> bool {
        self.valid_when.as_ref().map_or(true, |predicate| predicate(context))
    }

    fn is_valid_global_context(&self, context: &ActionContext) -> bool {
        match &self.valid_global_when {
            Some(predicate) => predicate(context),
            None => self.is_valid_context(context),
        }
    }

    fn is_add_to_popup(&self, context: &ActionContext) -> bool {
        match &self.popup_when {
            Some(predicate) => predicate(context),
            None => self.is_enabled_for_context(context),
        }
    }

    fn perform(&self, context: &ActionContext) {
        (self.perform)(context);
    }

    fn menu_bar_data(&self) -> Option<MenuData> {
        self.state.read().menu_bar_data.clone()
    }

    fn popup_menu_data(&self) -> Option<MenuData> {
        self.state.read().popup_menu_data.clone()
    }

    fn tool_bar_data(&self) -> Option<ToolBarData> {
        self.state.read().tool_bar_data.clone()
    }

    fn key_binding_data(&self) -> Option<KeyBindingData> {
        self.state.read().key_binding_data
    }

    fn default_key_binding_data(&self) -> Option<KeyBindingData> {
        self.state.read().default_key_binding_data
    }

    fn set_key_binding_data(&self, data: Option<KeyBindingData>) {
        let old = {
            let mut state = self.state.write();
            let old = std::mem::replace(&mut state.key_binding_data, data);
            if state.default_key_binding_data.is_none() {
                state.default_key_binding_data = data;
            }
            old
        };
        self.property_changed
            .emit(ActionPropertyChange::KeyBinding { old, new: data });
    }

    fn help_location(&self) -> Option<HelpLocation> {
        self.state.read().help_location.clone()
    }

    fn should_add_to_window(&self, is_main_window: bool) -> bool {
        let state = self.state.read();
        let has_bars = state.menu_bar_data.is_some() || state.tool_bar_data.is_some();
        has_bars && (is_main_window || self.detached_windows)
    }

    fn property_changed(&self) -> &Signal<ActionPropertyChange> {
        &self.property_changed
    }
}

static_assertions::assert_impl_all!(DockingAction: Send, Sync);
