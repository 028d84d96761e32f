//! Multi-state actions.

use std::sync::{Arc, Weak};

use horizon_dock_core::Signal;
use parking_lot::RwLock;

use super::{
    ActionPropertyChange, ActionRef, DockingAction, DockingActionIf, KeyBindingData, MenuData,
    ToolBarData,
};
use crate::context::ActionContext;
use crate::error::{DockingError, Result};
use crate::help::HelpLocation;

/// One selectable state of a [`MultiStateAction`].
///
/// Two states are equal when their names and user data are equal; the icon
/// and help location do not take part.
#[derive(Debug, Clone)]
pub struct ActionState<T> {
    name: String,
    icon: Option<String>,
    user_data: T,
    help_location: Option<HelpLocation>,
}

impl<T> ActionState<T> {
    pub fn new(name: impl Into<String>, icon: Option<String>, user_data: T) -> Self {
        Self {
            name: name.into(),
            icon,
            user_data,
            help_location: None,
        }
    }

    pub fn with_help_location(mut self, location: HelpLocation) -> Self {
        self.help_location = Some(location);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn user_data(&self) -> &T {
        &self.user_data
    }

    pub fn help_location(&self) -> Option<&HelpLocation> {
        self.help_location.as_ref()
    }
}

impl<T: PartialEq> PartialEq for ActionState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.user_data == other.user_data
    }
}

impl<T: Eq> Eq for ActionState<T> {}

/// What caused a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTrigger {
    /// The user picked a state from the action's menu.
    GuiAction,
    /// Application code selected the state.
    ApiCall,
}

struct States<T> {
    states: Vec<ActionState<T>>,
    current: usize,
}

/// A toolbar action with a current state chosen from a list.
///
/// The toolbar button shows the current state's icon; its drop-down lists
/// one entry per state (see [`state_actions`](Self::state_actions)).
pub struct MultiStateAction<T> {
    inner: DockingAction,
    states: RwLock<States<T>>,
    perform_on_primary_click: RwLock<bool>,
    /// Emitted with the new state and what caused the change.
    pub state_changed: Signal<(ActionState<T>, EventTrigger)>,
    /// Emitted when performing should open the state list instead.
    pub popup_requested: Signal<()>,
}

impl<T> MultiStateAction<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create an action with no states. `perform` runs on primary clicks.
    pub fn new<F>(name: impl Into<String>, owner: impl Into<String>, perform: F) -> Self
    where
        F: Fn(&ActionContext) + Send + Sync + 'static,
    {
        let inner = DockingAction::new(name, owner)
            .with_tool_bar_data(ToolBarData::default())
            .on_perform(perform);
        Self {
            inner,
            states: RwLock::new(States {
                states: Vec::new(),
                current: 0,
            }),
            perform_on_primary_click: RwLock::new(true),
            state_changed: Signal::new(),
            popup_requested: Signal::new(),
        }
    }

    /// When false, performing the action asks the host to show the state
    /// list rather than running the callback.
    pub fn set_perform_on_primary_click(&self, perform: bool) {
        *self.perform_on_primary_click.write() = perform;
    }

    pub fn set_group(&self, group: impl Into<String>) {
        let group = group.into();
        self.inner.update_tool_bar_data(|data| data.set_group(Some(group)));
    }

    pub fn set_sub_group(&self, sub_group: impl Into<String>) {
        let sub_group = sub_group.into();
        self.inner
            .update_tool_bar_data(|data| data.set_sub_group(Some(sub_group)));
    }

    /// Append a state. The first state added becomes current.
    pub fn add_state(&self, state: ActionState<T>) {
        let first = {
            let mut states = self.states.write();
            states.states.push(state.clone());
            states.states.len() == 1
        };
        if first {
            self.apply_state(0, state, EventTrigger::ApiCall);
        }
    }

    /// Replace all states and select the first.
    pub fn set_states(&self, states: Vec<ActionState<T>>) -> Result<()> {
        let Some(first) = states.first().cloned() else {
            tracing::warn!(
                target: horizon_dock_core::logging::targets::ACTIONS,
                action = %self.inner.full_name(),
                "multi-state action given no states"
            );
            return Err(DockingError::NoActionStates {
                action: self.inner.full_name(),
            });
        };
        self.states.write().states = states;
        self.apply_state(0, first, EventTrigger::ApiCall);
        Ok(())
    }

    pub fn states(&self) -> Vec<ActionState<T>> {
        self.states.read().states.clone()
    }

    pub fn current_state(&self) -> Option<ActionState<T>> {
        let states = self.states.read();
        states.states.get(states.current).cloned()
    }

    pub fn current_user_data(&self) -> Option<T> {
        self.current_state().map(|state| state.user_data)
    }

    pub fn set_current_state(&self, state: &ActionState<T>) -> Result<()> {
        self.set_current_state_with_trigger(state, EventTrigger::ApiCall)
    }

    pub fn set_current_state_with_trigger(
        &self,
        state: &ActionState<T>,
        trigger: EventTrigger,
    ) -> Result<()> {
        let index = self.states.read().states.iter().position(|s| s == state);
        match index {
            Some(index) => {
                self.apply_state(index, state.clone(), trigger);
                Ok(())
            }
            None => Err(self.unknown_state(state.name())),
        }
    }

    /// Select the state carrying `user_data`.
    pub fn set_current_state_by_user_data(&self, user_data: &T) -> Result<()> {
        let found = {
            let states = self.states.read();
            states
                .states
                .iter()
                .position(|s| s.user_data() == user_data)
                .map(|index| (index, states.states[index].clone()))
        };
        match found {
            Some((index, state)) => {
                self.apply_state(index, state, EventTrigger::ApiCall);
                Ok(())
            }
            None => Err(self.unknown_state("<user data>")),
        }
    }

    /// `"<name>: <current state>"`.
    pub fn tool_tip_text(&self) -> String {
        match self.current_state() {
            Some(state) => format!("{}: {}", self.inner.name(), state.name()),
            None => self.inner.name().to_string(),
        }
    }

    /// One menu action per state; performing one selects its state.
    pub fn state_actions(self: &Arc<Self>) -> Vec<ActionRef> {
        self.states()
            .into_iter()
            .map(|state| {
                let weak: Weak<Self> = Arc::downgrade(self);
                let mut action = DockingAction::new(state.name().to_string(), "multiStateAction")
                    .with_menu_bar_data(menu_data_for(&state));
                if let Some(location) = state.help_location() {
                    action = action.with_help_location(location.clone());
                }
                let action = action.on_perform(move |_| {
                    if let Some(owner) = weak.upgrade() {
                        let _ = owner.set_current_state_with_trigger(&state, EventTrigger::GuiAction);
                    }
                });
                Arc::new(action) as ActionRef
            })
            .collect()
    }

    fn apply_state(&self, index: usize, state: ActionState<T>, trigger: EventTrigger) {
        self.states.write().current = index;
        let icon = state.icon().map(str::to_string);
        self.inner.update_tool_bar_data(|data| data.set_icon(icon));
        self.inner.set_description(self.tool_tip_text());
        self.state_changed.emit((state, trigger));
    }

    fn unknown_state(&self, state: &str) -> DockingError {
        tracing::warn!(
            target: horizon_dock_core::logging::targets::ACTIONS,
            action = %self.inner.full_name(),
            state,
            "unknown action state"
        );
        DockingError::UnknownActionState {
            action: self.inner.full_name(),
            state: state.to_string(),
        }
    }
}

fn menu_data_for<T>(state: &ActionState<T>) -> MenuData {
    let data = MenuData::new([state.name().to_string()]);
    match state.icon() {
        Some(icon) => data.with_icon(icon),
        None => data,
    }
}

impl<T> DockingActionIf for MultiStateAction<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn owner(&self) -> &str {
        self.inner.owner()
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn set_enabled(&self, enabled: bool) -> bool {
        self.inner.set_enabled(enabled)
    }

    fn is_enabled_for_context(&self, context: &ActionContext) -> bool {
        self.inner.is_enabled_for_context(context)
    }

    fn is_valid_context(&self, context: &ActionContext) -> bool {
        self.inner.is_valid_context(context)
    }

    fn perform(&self, context: &ActionContext) {
        if *self.perform_on_primary_click.read() {
            self.inner.perform(context);
        } else {
            self.popup_requested.emit(());
        }
    }

    fn tool_bar_data(&self) -> Option<ToolBarData> {
        self.inner.tool_bar_data()
    }

    fn key_binding_data(&self) -> Option<KeyBindingData> {
        self.inner.key_binding_data()
    }

    fn default_key_binding_data(&self) -> Option<KeyBindingData> {
        self.inner.default_key_binding_data()
    }

    fn set_key_binding_data(&self, data: Option<KeyBindingData>) {
        self.inner.set_key_binding_data(data);
    }

    fn help_location(&self) -> Option<HelpLocation> {
        self.inner.help_location()
    }

    fn property_changed(&self) -> &Signal<ActionPropertyChange> {
        self.inner.property_changed()
    }
}
