//! Actions that forward to another action.

use horizon_dock_core::Signal;

use super::{
    ActionPropertyChange, ActionRef, DockingActionIf, KeyBindingData, MenuData, ToolBarData,
};
use crate::context::ActionContext;
use crate::help::HelpLocation;

type ContextPredicate = Box<dyn Fn(&ActionContext) -> bool + Send + Sync>;
type ContextMap = Box<dyn Fn(&ActionContext) -> ActionContext + Send + Sync>;

/// Forwards everything to a wrapped action unless overridden.
///
/// Overrides cover identity, presentation data and the context predicates.
/// A context translation applies to every context passed through to the
/// wrapped action. Enablement and key bindings always belong to the wrapped
/// action, so changes made through the wrapper are visible everywhere the
/// original is used.
pub struct WrappingAction {
    wrapped: ActionRef,
    name: Option<String>,
    owner: Option<String>,
    menu_bar_data: Option<Option<MenuData>>,
    popup_menu_data: Option<Option<MenuData>>,
    tool_bar_data: Option<Option<ToolBarData>>,
    enabled_when: Option<ContextPredicate>,
    valid_when: Option<ContextPredicate>,
    translate: Option<ContextMap>,
}

impl WrappingAction {
    pub fn new(wrapped: ActionRef) -> Self {
        Self {
            wrapped,
            name: None,
            owner: None,
            menu_bar_data: None,
            popup_menu_data: None,
            tool_bar_data: None,
            enabled_when: None,
            valid_when: None,
            translate: None,
        }
    }

    pub fn wrapped(&self) -> &ActionRef {
        &self.wrapped
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Replace the menu bar data; `None` hides the action from menu bars.
    pub fn with_menu_bar_data(mut self, data: Option<MenuData>) -> Self {
        self.menu_bar_data = Some(data);
        self
    }

    pub fn with_popup_menu_data(mut self, data: Option<MenuData>) -> Self {
        self.popup_menu_data = Some(data);
        self
    }

    pub fn with_tool_bar_data(mut self, data: Option<ToolBarData>) -> Self {
        self.tool_bar_data = Some(data);
        self
    }

    pub fn enabled_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ActionContext) -> bool + Send + Sync + 'static,
    {
        self.enabled_when = Some(Box::new(predicate));
        self
    }

    pub fn valid_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ActionContext) -> bool + Send + Sync + 'static,
    {
        self.valid_when = Some(Box::new(predicate));
        self
    }

    /// Rewrite contexts before they reach the wrapped action.
    pub fn translate_context<F>(mut self, translate: F) -> Self
    where
        F: Fn(&ActionContext) -> ActionContext + Send + Sync + 'static,
    {
        self.translate = Some(Box::new(translate));
        self
    }

    fn with_context<R>(&self, context: &ActionContext, f: impl FnOnce(&ActionContext) -> R) -> R {
        match &self.translate {
            Some(translate) => f(&translate(context)),
            None => f(context),
        }
    }
}

impl DockingActionIf for WrappingAction {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.wrapped.name())
    }

    fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or_else(|| self.wrapped.owner())
    }

    fn description(&self) -> String {
        self.wrapped.description()
    }

    fn is_enabled(&self) -> bool {
        self.wrapped.is_enabled()
    }

    fn set_enabled(&self, enabled: bool) -> bool {
        self.wrapped.set_enabled(enabled)
    }

    fn is_enabled_for_context(&self, context: &ActionContext) -> bool {
        self.with_context(context, |ctx| match &self.enabled_when {
            Some(predicate) => predicate(ctx),
            None => self.wrapped.is_enabled_for_context(ctx),
        })
    }

    fn is_valid_context(&self, context: &ActionContext) -> bool {
        self.with_context(context, |ctx| match &self.valid_when {
            Some(predicate) => predicate(ctx),
            None => self.wrapped.is_valid_context(ctx),
        })
    }

    fn is_valid_global_context(&self, context: &ActionContext) -> bool {
        self.with_context(context, |ctx| match &self.valid_when {
            Some(predicate) => predicate(ctx),
            None => self.wrapped.is_valid_global_context(ctx),
        })
    }

    fn is_add_to_popup(&self, context: &ActionContext) -> bool {
        self.with_context(context, |ctx| self.wrapped.is_add_to_popup(ctx))
    }

    fn perform(&self, context: &ActionContext) {
        self.with_context(context, |ctx| self.wrapped.perform(ctx));
    }

    fn menu_bar_data(&self) -> Option<MenuData> {
        match &self.menu_bar_data {
            Some(data) => data.clone(),
            None => self.wrapped.menu_bar_data(),
        }
    }

    fn popup_menu_data(&self) -> Option<MenuData> {
        match &self.popup_menu_data {
            Some(data) => data.clone(),
            None => self.wrapped.popup_menu_data(),
        }
    }

    fn tool_bar_data(&self) -> Option<ToolBarData> {
        match &self.tool_bar_data {
            Some(data) => data.clone(),
            None => self.wrapped.tool_bar_data(),
        }
    }

    fn key_binding_data(&self) -> Option<KeyBindingData> {
        self.wrapped.key_binding_data()
    }

    fn default_key_binding_data(&self) -> Option<KeyBindingData> {
        self.wrapped.default_key_binding_data()
    }

    fn set_key_binding_data(&self, data: Option<KeyBindingData>) {
        self.wrapped.set_key_binding_data(data);
    }

    fn help_location(&self) -> Option<HelpLocation> {
        self.wrapped.help_location()
    }

    fn should_add_to_window(&self, is_main_window: bool) -> bool {
        self.wrapped.should_add_to_window(is_main_window)
    }

    fn property_changed(&self) -> &Signal<ActionPropertyChange> {
        self.wrapped.property_changed()
    }
}
