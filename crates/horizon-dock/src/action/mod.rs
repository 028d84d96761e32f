//! The action model.
//!
//! Every command the docking engine can route (a menu item, a toolbar
//! button, a key binding, a popup entry) is a [`DockingActionIf`]. The trait
//! carries the presentation data for each place the action can appear, the
//! predicates that decide whether it applies in a given [`ActionContext`],
//! and the callback that performs it.
//!
//! Concrete actions:
//!
//! - [`DockingAction`]: configured with closures, the common case
//! - [`MultiStateAction`]: a toolbar action that cycles through [`ActionState`]s
//! - [`WrappingAction`]: forwards to another action, overriding parts of it
//!
//! Key chords are routed through [`KeyBindingRegistry`], which groups all
//! actions sharing a chord into a [`MultipleKeyAction`] bucket.

mod data;
mod docking_action;
mod key_bindings;
mod manager;
mod multiple_key;
mod state;
mod wrapping;

use std::fmt;
use std::sync::Arc;

use horizon_dock_core::Signal;

use crate::context::ActionContext;
use crate::help::HelpLocation;
use crate::keys::KeyChord;

pub use data::{KeyBindingData, KeyBindingPrecedence, MenuData, ToolBarData};
pub use docking_action::DockingAction;
pub use key_bindings::KeyBindingRegistry;
pub use manager::ActionManager;
pub use multiple_key::{ExecutableAction, KeyResolution, MultipleKeyAction};
pub use state::{ActionState, EventTrigger, MultiStateAction};
pub use wrapping::WrappingAction;

/// A property of an action that changed.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPropertyChange {
    Enabled(bool),
    Description,
    MenuBarData,
    PopupMenuData,
    ToolBarData,
    KeyBinding {
        old: Option<KeyBindingData>,
        new: Option<KeyBindingData>,
    },
}

/// A command that can be placed in menus and toolbars and bound to keys.
pub trait DockingActionIf: Send + Sync {
    fn name(&self) -> &str;

    /// Name of the plugin or subsystem that owns the action.
    fn owner(&self) -> &str;

    /// `"name (owner)"`.
    fn full_name(&self) -> String {
        format!("{} ({})", self.name(), self.owner())
    }

    /// Tooltip text.
    fn description(&self) -> String {
        String::new()
    }

    fn is_enabled(&self) -> bool;

    /// Set the enabled state, returning the previous value.
    fn set_enabled(&self, enabled: bool) -> bool;

    /// Whether the action can be performed in `context`.
    fn is_enabled_for_context(&self, _context: &ActionContext) -> bool {
        self.is_enabled()
    }

    /// Whether the action understands `context` at all.
    fn is_valid_context(&self, _context: &ActionContext) -> bool {
        true
    }

    /// Whether the action understands the tool-wide default context.
    fn is_valid_global_context(&self, context: &ActionContext) -> bool {
        self.is_valid_context(context)
    }

    /// Whether the action belongs in a popup menu built for `context`.
    fn is_add_to_popup(&self, context: &ActionContext) -> bool {
        self.is_enabled_for_context(context)
    }

    fn perform(&self, context: &ActionContext);

    fn menu_bar_data(&self) -> Option<MenuData> {
        None
    }

    fn popup_menu_data(&self) -> Option<MenuData> {
        None
    }

    fn tool_bar_data(&self) -> Option<ToolBarData> {
        None
    }

    fn key_binding_data(&self) -> Option<KeyBindingData> {
        None
    }

    /// The binding the action was first given.
    fn default_key_binding_data(&self) -> Option<KeyBindingData> {
        None
    }

    fn set_key_binding_data(&self, data: Option<KeyBindingData>);

    fn key_binding(&self) -> Option<KeyChord> {
        self.key_binding_data().map(|data| data.chord())
    }

    fn help_location(&self) -> Option<HelpLocation> {
        None
    }

    /// Whether a window's menu bar and toolbar should carry this action.
    ///
    /// The main window takes every menu and toolbar action; detached windows
    /// take none unless an action opts in.
    fn should_add_to_window(&self, is_main_window: bool) -> bool {
        is_main_window && (self.menu_bar_data().is_some() || self.tool_bar_data().is_some())
    }

    /// Emitted after any presentation property changes.
    fn property_changed(&self) -> &Signal<ActionPropertyChange>;
}

/// A shared action reference.
pub type ActionRef = Arc<dyn DockingActionIf>;

/// Contributes actions to the popup menus of other components.
pub trait PopupActionProvider: Send + Sync {
    /// Actions to offer in a popup over a component with `context`.
    fn popup_actions(&self, context: &ActionContext) -> Vec<ActionRef>;
}

/// Identity of an action instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionKey(usize);

impl ActionKey {
    pub fn of(action: &ActionRef) -> Self {
        Self(Arc::as_ptr(action) as *const () as usize)
    }
}

impl fmt::Debug for dyn DockingActionIf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockingAction")
            .field("name", &self.name())
            .field("owner", &self.owner())
            .field("key_binding", &self.key_binding())
            .finish()
    }
}

/// Whether two references point at the same action.
pub fn same_action(a: &ActionRef, b: &ActionRef) -> bool {
    ActionKey::of(a) == ActionKey::of(b)
}
